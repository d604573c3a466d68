//! Capability flags attached to mapped ranges.

use serde::{Deserialize, Serialize};
use vellum_carton::bitflags;

bitflags! {
    /// Editor features that may act on a mapped range.
    ///
    /// Each facet is independent; a range with no facet set still translates
    /// offsets but no feature should surface results through it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct CodeFeatures: u8 {
        /// Diagnostics reported by the host are surfaced
        const VERIFICATION = 1 << 0;
        /// Completion requests are forwarded
        const COMPLETION = 1 << 1;
        /// Hover, semantic tokens and other semantic queries
        const SEMANTIC = 1 << 2;
        /// Definition, references and rename
        const NAVIGATION = 1 << 3;
        /// Document symbols and folding
        const STRUCTURE = 1 << 4;
        /// Formatting edits
        const FORMAT = 1 << 5;
    }
}

impl CodeFeatures {
    /// Every facet.
    pub const ALL: Self = Self::all();

    /// Navigation only, used for text copied verbatim out of option literals.
    pub const NAVIGATION_ONLY: Self = Self::NAVIGATION;

    /// Diagnostics only.
    pub const VERIFICATION_ONLY: Self = Self::VERIFICATION;

    /// Completion only.
    pub const COMPLETION_ONLY: Self = Self::COMPLETION;

    /// Navigation plus completion, used for component and directive names.
    pub const NAVIGATION_AND_COMPLETION: Self =
        Self::from_bits_truncate(Self::NAVIGATION.bits() | Self::COMPLETION.bits());

    #[inline]
    pub fn verification(self) -> bool {
        self.contains(Self::VERIFICATION)
    }

    #[inline]
    pub fn completion(self) -> bool {
        self.contains(Self::COMPLETION)
    }

    #[inline]
    pub fn semantic(self) -> bool {
        self.contains(Self::SEMANTIC)
    }

    #[inline]
    pub fn navigation(self) -> bool {
        self.contains(Self::NAVIGATION)
    }

    #[inline]
    pub fn structure(self) -> bool {
        self.contains(Self::STRUCTURE)
    }

    #[inline]
    pub fn format(self) -> bool {
        self.contains(Self::FORMAT)
    }
}
