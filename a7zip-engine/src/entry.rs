//! Entry metadata collected when an archive is opened.

use a7zip_core::create::attributes_from_mode;
use a7zip_core::property::{PropId, PropValue};

/// Metadata of one entry, in engine representation.
///
/// Strings that came from the archive without a known encoding hold
/// disguised bytes (one char per byte).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct EntryRecord {
    pub path: String,
    pub is_dir: bool,
    pub size: u64,
    pub packed_size: u64,
    pub posix_mode: Option<u32>,
    pub modified: Option<i64>,
    pub crc: Option<u32>,
    pub encrypted: bool,
    pub method: Option<String>,
    pub comment: Option<String>,
    pub user: Option<String>,
    pub group: Option<String>,
    pub symlink: Option<String>,
    pub hardlink: Option<String>,
}

impl EntryRecord {
    fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    fn extension(&self) -> Option<&str> {
        if self.is_dir {
            return None;
        }
        let name = self.name();
        name.rfind('.')
            .filter(|&dot| dot > 0)
            .map(|dot| &name[dot + 1..])
    }

    /// Windows attribute bits, POSIX mode in the high half.
    pub fn attributes(&self) -> u32 {
        match self.posix_mode {
            Some(mode) => attributes_from_mode(mode, self.is_dir),
            None if self.is_dir => a7zip_core::create::ATTRIBUTE_DIRECTORY,
            None => 0,
        }
    }

    /// Value of `prop` for this entry.
    pub fn property(&self, prop: PropId) -> PropValue {
        match prop {
            PropId::Path => PropValue::from(self.path.as_str()),
            PropId::Name => PropValue::from(self.name()),
            PropId::Extension => PropValue::from(self.extension()),
            PropId::IsDir => PropValue::Bool(self.is_dir),
            PropId::Size => PropValue::Long(self.size as i64),
            PropId::PackSize => PropValue::Long(self.packed_size as i64),
            PropId::Attributes => PropValue::Int(self.attributes() as i32),
            PropId::PosixAttributes => PropValue::from(self.posix_mode.map(|mode| mode as i32)),
            PropId::ModificationTime => PropValue::from(self.modified),
            PropId::Crc => PropValue::from(self.crc.map(i64::from)),
            PropId::Encrypted => PropValue::Bool(self.encrypted),
            PropId::Method => PropValue::from(self.method.clone()),
            PropId::Comment => PropValue::from(self.comment.clone()),
            PropId::Commented => PropValue::Bool(self.comment.is_some()),
            PropId::User => PropValue::from(self.user.clone()),
            PropId::Group => PropValue::from(self.group.clone()),
            PropId::SymLink => PropValue::from(self.symlink.clone()),
            PropId::HardLink => PropValue::from(self.hardlink.clone()),
            _ => PropValue::Empty,
        }
    }
}

/// Strip the directory marker so that `"folder/"` reads as `"folder"`.
pub(crate) fn normalize_path(path: &str) -> String {
    path.trim_end_matches('/').to_string()
}
