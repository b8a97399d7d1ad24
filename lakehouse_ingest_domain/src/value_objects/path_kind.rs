use std::fmt;

/// The kind of storage location a customer path resolves to. Every kind
/// except [`PathKind::EphemeralScratch`] must resolve outside the system
/// temp directory - the Path Resolver asserts this on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathKind {
    TabularRoot,
    VectorRoot,
    GraphRoot,
    LoraRoot,
    UploadStaging,
    HandlerStore,
    EphemeralScratch,
}

impl PathKind {
    pub const PERSISTENT: [PathKind; 6] = [
        PathKind::TabularRoot,
        PathKind::VectorRoot,
        PathKind::GraphRoot,
        PathKind::LoraRoot,
        PathKind::UploadStaging,
        PathKind::HandlerStore,
    ];

    pub fn dir_name(&self) -> &'static str {
        match self {
            PathKind::TabularRoot => "tabular",
            PathKind::VectorRoot => "vector",
            PathKind::GraphRoot => "graph",
            PathKind::LoraRoot => "lora",
            PathKind::UploadStaging => "uploads",
            PathKind::HandlerStore => "handlers",
            PathKind::EphemeralScratch => "scratch",
        }
    }

    /// Every kind but this one must never resolve under the OS temp
    /// directory; the scratch kind is the only one allowed to.
    pub fn is_ephemeral(&self) -> bool {
        matches!(self, PathKind::EphemeralScratch)
    }
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dir_name())
    }
}
