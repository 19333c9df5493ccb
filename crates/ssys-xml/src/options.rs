//! Options for reading XML documents.

/// How the XML reader turns markup into events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Trim whitespace around text and drop whitespace-only text (default: true)
    pub trim_text: bool,

    /// Deliver `<![CDATA[...]]>` sections as text (default: true)
    /// When false they are dropped like comments.
    pub keep_cdata: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            trim_text: true,
            keep_cdata: true,
        }
    }
}

impl ReaderOptions {
    /// Create new default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep text exactly as written, whitespace included.
    pub fn untrimmed(mut self) -> Self {
        self.trim_text = false;
        self
    }

    /// Drop CDATA sections.
    pub fn skip_cdata(mut self) -> Self {
        self.keep_cdata = false;
        self
    }
}
