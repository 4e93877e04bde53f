use thiserror::Error;

/// How an image is currently being used.
///
/// wgpu performs the actual barriers; this is the checked record of what each
/// image is expected to be used for next.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ImageLayout {
    Undefined,
    TransferDst,
    ShaderReadOnly,
    ColorAttachment,
    DepthAttachment,
    TransferSrc,
}

impl ImageLayout {
    fn can_become(self, next: ImageLayout) -> bool {
        use ImageLayout::*;
        matches!(
            (self, next),
            (Undefined, TransferDst)
                | (Undefined, ColorAttachment)
                | (Undefined, DepthAttachment)
                | (TransferDst, ShaderReadOnly)
                | (ColorAttachment, TransferSrc)
                | (TransferSrc, ColorAttachment)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("image layout: '{image}' is {found:?}, expected {expected:?}")]
    Mismatch {
        image: String,
        expected: ImageLayout,
        found: ImageLayout,
    },

    #[error("image layout: '{image}' cannot go from {from:?} to {to:?}")]
    InvalidTransition {
        image: String,
        from: ImageLayout,
        to: ImageLayout,
    },
}

/// Layout state of one image.
#[derive(Debug, Clone)]
pub struct LayoutTracker {
    image: String,
    current: ImageLayout,
}

impl LayoutTracker {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            current: ImageLayout::Undefined,
        }
    }

    #[inline]
    pub fn current(&self) -> ImageLayout {
        self.current
    }

    /// Moves from `expected` to `next`, failing if the image is elsewhere.
    pub fn transition(&mut self, expected: ImageLayout, next: ImageLayout) -> Result<(), LayoutError> {
        if self.current != expected {
            return Err(LayoutError::Mismatch {
                image: self.image.clone(),
                expected,
                found: self.current,
            });
        }
        self.transition_to(next)
    }

    /// Moves from whatever the current layout is to `next`.
    ///
    /// Staying in the same attachment layout is a no-op.
    pub fn transition_to(&mut self, next: ImageLayout) -> Result<(), LayoutError> {
        if self.current == next
            && matches!(next, ImageLayout::ColorAttachment | ImageLayout::DepthAttachment)
        {
            return Ok(());
        }
        if !self.current.can_become(next) {
            return Err(LayoutError::InvalidTransition {
                image: self.image.clone(),
                from: self.current,
                to: next,
            });
        }
        self.current = next;
        Ok(())
    }
}
