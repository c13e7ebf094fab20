pub mod clip;
pub mod decode;

pub use clip::extract_clip;
pub use decode::{Decoder, Sph2Pipe};

/// One speaker track of a dual-channel telephone recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    A,
    B,
}

impl Channel {
    /// Both tracks, in decoder order.
    pub const BOTH: [Channel; 2] = [Channel::A, Channel::B];

    /// Map a transcript speaker tag to its track. The tag `"B:"` selects the
    /// second channel; any other tag selects the first.
    pub fn from_speaker_tag(tag: &str) -> Self {
        if tag == "B:" {
            Channel::B
        } else {
            Channel::A
        }
    }

    /// Channel number in the decoder's 1-based convention.
    pub fn number(self) -> u32 {
        match self {
            Channel::A => 1,
            Channel::B => 2,
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}
