//! Property model shared with the engine.
//!
//! Archives and entries describe themselves through properties: a closed set
//! of identifiers ([`PropId`]) whose values carry one of a few types
//! ([`PropType`]). The identifiers cross the engine boundary by ordinal, so
//! the order here is part of the ABI. New identifiers may only be appended.
//!
//! # Example
//!
//! ```rust
//! use a7zip_core::property::{PropId, PropType, PropValue};
//!
//! assert_eq!(PropId::Path.ordinal(), 3);
//! assert_eq!(PropId::from_ordinal(6), Some(PropId::IsDir));
//!
//! let value = PropValue::Bool(true);
//! assert_eq!(value.prop_type(), PropType::Boolean);
//! assert!(value.as_bool());
//! assert_eq!(value.as_long(), 0);
//! ```

use std::fmt;

macro_rules! prop_ids {
    ($($(#[$doc:meta])* $variant:ident = $ordinal:literal,)+) => {
        /// Property identifier, shared with the engine by ordinal.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u32)]
        pub enum PropId {
            $($(#[$doc])* $variant = $ordinal,)+
        }

        impl PropId {
            /// Every identifier in ordinal order.
            pub const ALL: &'static [PropId] = &[$(PropId::$variant,)+];

            /// Name of the identifier.
            pub fn name(self) -> &'static str {
                match self {
                    $(PropId::$variant => stringify!($variant),)+
                }
            }
        }
    };
}

prop_ids! {
    /// No property.
    NoProperty = 0,
    /// Index of the main sub-file.
    MainSubfile = 1,
    /// Handler-specific item index.
    HandlerItemIndex = 2,
    /// Full path of the entry inside the archive.
    Path = 3,
    /// File name.
    Name = 4,
    /// File extension.
    Extension = 5,
    /// The entry is a directory.
    IsDir = 6,
    /// Unpacked size.
    Size = 7,
    /// Packed size.
    PackSize = 8,
    /// Windows attributes, POSIX mode in the high 16 bits.
    Attributes = 9,
    /// Creation time.
    CreationTime = 10,
    /// Last access time.
    AccessTime = 11,
    /// Last modification time.
    ModificationTime = 12,
    /// Solid archive.
    Solid = 13,
    /// Has a comment.
    Commented = 14,
    /// The entry is encrypted.
    Encrypted = 15,
    /// Entry continues from a previous volume.
    SplitBefore = 16,
    /// Entry continues in the next volume.
    SplitAfter = 17,
    /// Dictionary size.
    DictionarySize = 18,
    /// CRC-32 of the unpacked data.
    Crc = 19,
    /// Archive type.
    Type = 20,
    /// Anti item.
    IsAnti = 21,
    /// Compression method.
    Method = 22,
    /// Host operating system.
    HostOs = 23,
    /// File system.
    FileSystem = 24,
    /// Owner user name.
    User = 25,
    /// Owner group name.
    Group = 26,
    /// Block.
    Block = 27,
    /// Comment.
    Comment = 28,
    /// Position.
    Position = 29,
    /// Path prefix.
    Prefix = 30,
    /// Number of sub-directories.
    NumSubDirs = 31,
    /// Number of sub-files.
    NumSubFiles = 32,
    /// Version needed to extract.
    UnpackVersion = 33,
    /// Volume.
    Volume = 34,
    /// The archive is part of a volume set.
    IsVolume = 35,
    /// Offset.
    Offset = 36,
    /// Number of links.
    Links = 37,
    /// Number of blocks.
    NumBlocks = 38,
    /// Number of volumes.
    NumVolumes = 39,
    /// Time precision.
    TimeType = 40,
    /// 64-bit.
    Bit64 = 41,
    /// Big endian.
    BigEndian = 42,
    /// CPU.
    Cpu = 43,
    /// Physical size of the archive.
    PhySize = 44,
    /// Size of the headers.
    HeadersSize = 45,
    /// Checksum.
    Checksum = 46,
    /// Characteristics.
    Characteristics = 47,
    /// Virtual address.
    VirtualAddress = 48,
    /// Identifier.
    Id = 49,
    /// Short name.
    ShortName = 50,
    /// Creator application.
    CreatorApp = 51,
    /// Sector size.
    SectorSize = 52,
    /// POSIX mode.
    PosixAttributes = 53,
    /// Symbolic link target.
    SymLink = 54,
    /// Error.
    Error = 55,
    /// Total size.
    TotalSize = 56,
    /// Free space.
    FreeSpace = 57,
    /// Cluster size.
    ClusterSize = 58,
    /// Volume name.
    VolumeName = 59,
    /// Local name.
    LocalName = 60,
    /// Provider.
    Provider = 61,
    /// NT security descriptor.
    NtSecure = 62,
    /// Alternate stream.
    IsAltStream = 63,
    /// Auxiliary item.
    IsAux = 64,
    /// Deleted item.
    IsDeleted = 65,
    /// Tree.
    IsTree = 66,
    /// SHA-1.
    Sha1 = 67,
    /// SHA-256.
    Sha256 = 68,
    /// Error type.
    ErrorType = 69,
    /// Number of errors.
    NumErrors = 70,
    /// Error flags.
    ErrorFlags = 71,
    /// Warning flags.
    WarningFlags = 72,
    /// Warning.
    Warning = 73,
    /// Number of streams.
    NumStreams = 74,
    /// Number of alternate streams.
    NumAltStreams = 75,
    /// Size of alternate streams.
    AltStreamsSize = 76,
    /// Virtual size.
    VirtualSize = 77,
    /// Unpack size.
    UnpackSize = 78,
    /// Total physical size over all volumes.
    TotalPhySize = 79,
    /// Index of the volume.
    VolumeIndex = 80,
    /// Sub-type.
    SubType = 81,
    /// Short comment.
    ShortComment = 82,
    /// Code page.
    CodePage = 83,
    /// Not an archive type.
    IsNotArcType = 84,
    /// Physical size can't be detected.
    PhySizeCantBeDetected = 85,
    /// Zero tail is allowed.
    ZerosTailIsAllowed = 86,
    /// Tail size.
    TailSize = 87,
    /// Embedded stub size.
    EmbeddedStubSize = 88,
    /// NT reparse data.
    NtReparse = 89,
    /// Hard link target.
    HardLink = 90,
    /// Inode.
    INode = 91,
    /// Stream identifier.
    StreamId = 92,
    /// Read only.
    ReadOnly = 93,
    /// Output name.
    OutName = 94,
    /// Copy link.
    CopyLink = 95,
}

impl PropId {
    /// Ordinal shared with the engine.
    pub fn ordinal(self) -> u32 {
        self as u32
    }

    /// Look up an identifier by ordinal.
    pub fn from_ordinal(ordinal: u32) -> Option<Self> {
        Self::ALL.get(ordinal as usize).copied()
    }
}

impl fmt::Display for PropId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Type of a property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropType {
    /// `bool`.
    Boolean,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    Long,
    /// String.
    String,
    /// No value, or a type the bridge does not model.
    Unknown,
}

impl fmt::Display for PropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Long => "long",
            Self::String => "string",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Value of a property as reported by the engine.
///
/// Strings may carry "disguised bytes": raw bytes in an unknown encoding,
/// one byte per `char` in `U+0000..=U+00FF`. See [`crate::charset`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PropValue {
    /// No value.
    #[default]
    Empty,
    /// Boolean value.
    Bool(bool),
    /// 32-bit value. Attribute bit sets are stored bit-for-bit.
    Int(i32),
    /// 64-bit value.
    Long(i64),
    /// String value.
    String(String),
}

impl PropValue {
    /// Type of the value.
    pub fn prop_type(&self) -> PropType {
        match self {
            Self::Empty => PropType::Unknown,
            Self::Bool(_) => PropType::Boolean,
            Self::Int(_) => PropType::Integer,
            Self::Long(_) => PropType::Long,
            Self::String(_) => PropType::String,
        }
    }

    /// Returns true if there is no value.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// The boolean value, or `false` for any other type.
    pub fn as_bool(&self) -> bool {
        matches!(self, Self::Bool(true))
    }

    /// The integer value, or `0` for any other type.
    pub fn as_int(&self) -> i32 {
        match self {
            Self::Int(value) => *value,
            _ => 0,
        }
    }

    /// The long value, or `0` for any other type.
    pub fn as_long(&self) -> i64 {
        match self {
            Self::Long(value) => *value,
            _ => 0,
        }
    }

    /// The string value, or `""` for any other type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::String(value) => value,
            _ => "",
        }
    }

    /// Consume the value, returning the string or `""`.
    pub fn into_string(self) -> String {
        match self {
            Self::String(value) => value,
            _ => String::new(),
        }
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl<T: Into<PropValue>> From<Option<T>> for PropValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}
