use std::fmt::{self, Display, Formatter};

/// Closed set of emotion categories carried by the corpus filenames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Emotion {
    Neutral,
    Calm,
    Happy,
    Sad,
    Angry,
    Fearful,
    Disgust,
    Surprised,
    /// Files outside the naming convention train as their own class.
    Unknown,
}

impl Emotion {
    pub const COUNT: usize = 9;

    pub const ALL: [Emotion; Emotion::COUNT] = [
        Emotion::Neutral,
        Emotion::Calm,
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Fearful,
        Emotion::Disgust,
        Emotion::Surprised,
        Emotion::Unknown,
    ];

    /// Map the 1-8 emotion code embedded in corpus filenames.
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(Emotion::Neutral),
            2 => Some(Emotion::Calm),
            3 => Some(Emotion::Happy),
            4 => Some(Emotion::Sad),
            5 => Some(Emotion::Angry),
            6 => Some(Emotion::Fearful),
            7 => Some(Emotion::Disgust),
            8 => Some(Emotion::Surprised),
            _ => None,
        }
    }

    /// Derive the label from a bare filename following the hyphen-delimited
    /// convention where the third field is the emotion code, e.g.
    /// `03-01-05-01-02-02-12.wav` carries code 5 ("angry").
    ///
    /// Anything that does not fit the convention is `Unknown`.
    pub fn parse_filename(name: &str) -> Self {
        name.split('-')
            .nth(2)
            .and_then(|field| field.parse::<u32>().ok())
            .and_then(Self::from_code)
            .unwrap_or(Emotion::Unknown)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Neutral => "neutral",
            Emotion::Calm => "calm",
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Fearful => "fearful",
            Emotion::Disgust => "disgust",
            Emotion::Surprised => "surprised",
            Emotion::Unknown => "unknown",
        }
    }

    /// Stable classifier output index.
    pub fn class_index(self) -> i64 {
        self as i64
    }

    pub fn from_class_index(index: i64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i))
            .copied()
    }
}

impl Display for Emotion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Emotion;

    #[test]
    fn conventional_filename_yields_its_code() {
        assert_eq!(
            Emotion::parse_filename("03-01-05-01-02-02-12.wav"),
            Emotion::Angry
        );
        assert_eq!(
            Emotion::parse_filename("03-01-08-01-02-02-12.wav"),
            Emotion::Surprised
        );
    }

    #[test]
    fn unconventional_filenames_fall_back_to_unknown() {
        assert_eq!(Emotion::parse_filename("badname.wav"), Emotion::Unknown);
        assert_eq!(Emotion::parse_filename("x-y-99-z.wav"), Emotion::Unknown);
        assert_eq!(Emotion::parse_filename("a-b.wav"), Emotion::Unknown);
        assert_eq!(Emotion::parse_filename("a-b-3.wav"), Emotion::Unknown);
        assert_eq!(Emotion::parse_filename(""), Emotion::Unknown);
    }

    #[test]
    fn class_indices_round_trip() {
        for (expected, emotion) in Emotion::ALL.into_iter().enumerate() {
            assert_eq!(emotion.class_index(), expected as i64);
            assert_eq!(Emotion::from_class_index(expected as i64), Some(emotion));
        }
        assert_eq!(Emotion::from_class_index(Emotion::COUNT as i64), None);
        assert_eq!(Emotion::from_class_index(-1), None);
    }
}
