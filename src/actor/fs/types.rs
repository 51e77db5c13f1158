/// What happened to a path during one debounce window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ChangeKind {
    Created,
    Modified,
    Removed,
}

impl ChangeKind {
    pub(super) fn from_event(kind: &notify::EventKind) -> Option<Self> {
        use notify::EventKind;
        use notify::event::ModifyKind;

        match kind {
            EventKind::Create(_) => Some(Self::Created),
            EventKind::Remove(_) => Some(Self::Removed),
            // Metadata-only updates (mtime, chmod) would retrigger syncs
            EventKind::Modify(ModifyKind::Metadata(_)) => None,
            EventKind::Modify(_) => Some(Self::Modified),
            _ => None,
        }
    }

    /// Net effect of `self` followed by `next` on the same path.
    ///
    /// `None` means the two cancel out (created, then removed).
    pub(super) fn then(self, next: Self) -> Option<Self> {
        match (self, next) {
            (Self::Created, Self::Removed) => None,
            (Self::Removed, Self::Created | Self::Modified) => Some(next),
            (Self::Modified, Self::Removed) => Some(Self::Removed),
            _ => Some(self),
        }
    }

    pub(super) fn label(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
            Self::Removed => "removed",
        }
    }
}
