//! Mood categories detected from a prompt, with catalog query templates used
//! when the language model cannot fill a batch.

/// Broad vibe of a prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoodCategory {
    Workout,
    /// Also covers study and lo-fi prompts
    Chill,
    Indie,
    Electronic,
    Jazz,
    /// Nothing recognizable; mainstream pop templates plus the raw prompt
    Generic,
}

struct Template {
    keywords: &'static [&'static str],
    genres: &'static [&'static str],
    energy: f32,
    valence: f32,
    artists: &'static [&'static str],
}

const WORKOUT: Template = Template {
    keywords: &["workout", "gym", "exercise", "running", "cardio", "lifting", "training", "pump"],
    genres: &["Hip Hop", "Electronic", "Rock"],
    energy: 0.85,
    valence: 0.8,
    artists: &[
        "Eminem",
        "Survivor",
        "Kanye West",
        "Imagine Dragons",
        "The Prodigy",
        "Calvin Harris",
        "Linkin Park",
    ],
};

const CHILL: Template = Template {
    keywords: &["chill", "relax", "calm", "study", "studying", "lofi", "lo-fi", "sleep", "mellow"],
    genres: &["Lo-fi", "Ambient", "Indie"],
    energy: 0.35,
    valence: 0.55,
    artists: &[
        "Nujabes",
        "Khruangbin",
        "Tycho",
        "Bon Iver",
        "Norah Jones",
        "Jack Johnson",
        "Men I Trust",
    ],
};

const INDIE: Template = Template {
    keywords: &["indie", "alternative", "alt rock", "bedroom pop"],
    genres: &["Indie Pop", "Alternative", "Indie Rock"],
    energy: 0.6,
    valence: 0.65,
    artists: &[
        "Arctic Monkeys",
        "Tame Impala",
        "Phoebe Bridgers",
        "The Strokes",
        "Vampire Weekend",
        "Glass Animals",
        "Mac DeMarco",
    ],
};

const ELECTRONIC: Template = Template {
    keywords: &["electronic", "edm", "techno", "house", "synth", "rave", "trance"],
    genres: &["Electronic", "Synthwave", "EDM"],
    energy: 0.8,
    valence: 0.75,
    artists: &[
        "Daft Punk",
        "Disclosure",
        "Avicii",
        "ODESZA",
        "Deadmau5",
        "Justice",
        "Fred again..",
    ],
};

const JAZZ: Template = Template {
    keywords: &["jazz", "blues", "smooth", "swing", "bebop"],
    genres: &["Jazz", "Smooth Jazz", "Blues"],
    energy: 0.45,
    valence: 0.55,
    artists: &[
        "Miles Davis",
        "John Coltrane",
        "Chet Baker",
        "Ella Fitzgerald",
        "Herbie Hancock",
        "Dave Brubeck",
        "B.B. King",
    ],
};

const GENERIC: Template = Template {
    keywords: &[],
    genres: &["Pop", "Dance Pop", "Electropop"],
    energy: 0.7,
    valence: 0.8,
    artists: &[
        "Dua Lipa",
        "The Weeknd",
        "Taylor Swift",
        "Harry Styles",
        "Ed Sheeran",
        "Olivia Rodrigo",
        "Bruno Mars",
    ],
};

impl MoodCategory {
    /// Detection order matters: "chill workout" is a workout.
    const DETECTION_ORDER: [MoodCategory; 5] = [
        MoodCategory::Workout,
        MoodCategory::Chill,
        MoodCategory::Indie,
        MoodCategory::Electronic,
        MoodCategory::Jazz,
    ];

    /// Pick the first category whose keywords appear in the prompt.
    pub fn detect(prompt: &str) -> Self {
        let prompt = prompt.to_lowercase();
        Self::DETECTION_ORDER
            .into_iter()
            .find(|category| category.template().keywords.iter().any(|k| prompt.contains(k)))
            .unwrap_or(MoodCategory::Generic)
    }

    fn template(&self) -> &'static Template {
        match self {
            MoodCategory::Workout => &WORKOUT,
            MoodCategory::Chill => &CHILL,
            MoodCategory::Indie => &INDIE,
            MoodCategory::Electronic => &ELECTRONIC,
            MoodCategory::Jazz => &JAZZ,
            MoodCategory::Generic => &GENERIC,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MoodCategory::Workout => "workout",
            MoodCategory::Chill => "chill",
            MoodCategory::Indie => "indie",
            MoodCategory::Electronic => "electronic",
            MoodCategory::Jazz => "jazz",
            MoodCategory::Generic => "generic",
        }
    }

    /// Genre tags given to songs whose source supplied none.
    pub fn genres(&self) -> &'static [&'static str] {
        self.template().genres
    }

    pub fn energy(&self) -> f32 {
        self.template().energy
    }

    pub fn valence(&self) -> f32 {
        self.template().valence
    }

    /// Catalog queries for the fallback pass, best first.
    ///
    /// Generic prompts search the prompt text itself before the templates.
    pub fn fallback_queries(&self, prompt: &str) -> Vec<String> {
        let mut queries = Vec::new();
        let prompt = prompt.trim();
        if *self == MoodCategory::Generic && !prompt.is_empty() {
            queries.push(prompt.to_string());
        }
        queries.extend(
            self.template()
                .artists
                .iter()
                .map(|artist| format!("artist:\"{}\"", artist)),
        );
        queries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_categories() {
        assert_eq!(MoodCategory::detect("workout music"), MoodCategory::Workout);
        assert_eq!(MoodCategory::detect("Songs for the GYM"), MoodCategory::Workout);
        assert_eq!(MoodCategory::detect("indie for studying"), MoodCategory::Chill);
        assert_eq!(MoodCategory::detect("alternative rock"), MoodCategory::Indie);
        assert_eq!(MoodCategory::detect("late night techno"), MoodCategory::Electronic);
        assert_eq!(MoodCategory::detect("smooth saxophone"), MoodCategory::Jazz);
        assert_eq!(MoodCategory::detect("songs my grandma loves"), MoodCategory::Generic);
    }

    #[test]
    fn test_generic_queries_start_with_prompt() {
        let queries = MoodCategory::Generic.fallback_queries("sea shanties");
        assert_eq!(queries[0], "sea shanties");
        assert!(queries[1].starts_with("artist:\""));
    }

    #[test]
    fn test_category_queries_are_artist_queries() {
        let queries = MoodCategory::Workout.fallback_queries("workout music");
        assert!(queries.iter().all(|q| q.starts_with("artist:\"")));
        assert!(!queries.is_empty());
    }

    #[test]
    fn test_every_category_has_genres() {
        for category in MoodCategory::DETECTION_ORDER
            .into_iter()
            .chain([MoodCategory::Generic])
        {
            assert!(!category.genres().is_empty(), "{}", category.name());
        }
    }
}
