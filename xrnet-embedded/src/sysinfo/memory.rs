use super::{SysInfo, SysInfoStore};

pub struct MemorySysInfo {
    info: Option<SysInfo>,
}

impl MemorySysInfo {
    pub fn new(info: SysInfo) -> Self {
        Self { info: Some(info) }
    }

    /// A store whose system info has not been loaded yet.
    pub fn empty() -> Self {
        Self { info: None }
    }

    pub fn load(&mut self, info: SysInfo) {
        self.info = Some(info);
    }
}

impl Default for MemorySysInfo {
    fn default() -> Self {
        Self::new(SysInfo::default())
    }
}

impl SysInfoStore for MemorySysInfo {
    fn get(&self) -> Option<&SysInfo> {
        self.info.as_ref()
    }

    fn get_mut(&mut self) -> Option<&mut SysInfo> {
        self.info.as_mut()
    }
}
