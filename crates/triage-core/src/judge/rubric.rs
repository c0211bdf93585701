use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Qualitative bands of the 0..=100 similarity scale, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    VeryDifferent,
    SomeSimilarity,
    ModeratelySimilar,
    Similar,
    VerySimilar,
}

impl ScoreBand {
    pub const ALL: [ScoreBand; 5] = [
        ScoreBand::VeryDifferent,
        ScoreBand::SomeSimilarity,
        ScoreBand::ModeratelySimilar,
        ScoreBand::Similar,
        ScoreBand::VerySimilar,
    ];

    pub fn range(&self) -> RangeInclusive<u8> {
        match self {
            ScoreBand::VeryDifferent => 0..=29,
            ScoreBand::SomeSimilarity => 30..=49,
            ScoreBand::ModeratelySimilar => 50..=69,
            ScoreBand::Similar => 70..=89,
            ScoreBand::VerySimilar => 90..=100,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ScoreBand::VeryDifferent => "Very different or inappropriate",
            ScoreBand::SomeSimilarity => "Some similarity but missing key elements",
            ScoreBand::ModeratelySimilar => "Moderately similar, captures main idea",
            ScoreBand::Similar => "Similar with minor differences",
            ScoreBand::VerySimilar => "Very similar in tone, content, and intent",
        }
    }

    /// Scores above 100 saturate into the top band.
    pub fn of(score: u8) -> ScoreBand {
        ScoreBand::ALL
            .into_iter()
            .find(|band| band.range().contains(&score))
            .unwrap_or(ScoreBand::VerySimilar)
    }

    /// Rubric lines as shown to the judge model, best band first.
    pub fn rubric() -> String {
        ScoreBand::ALL
            .iter()
            .rev()
            .map(|band| {
                let r = band.range();
                format!("- {}-{}: {}", r.start(), r.end(), band.description())
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_partition_the_scale() {
        for score in 0..=100u8 {
            let hits = ScoreBand::ALL
                .iter()
                .filter(|b| b.range().contains(&score))
                .count();
            assert_eq!(hits, 1, "score {} must fall in exactly one band", score);
        }
        for pair in ScoreBand::ALL.windows(2) {
            assert_eq!(*pair[0].range().end() + 1, *pair[1].range().start());
        }
    }

    #[test]
    fn band_lookup_edges() {
        assert_eq!(ScoreBand::of(1), ScoreBand::VeryDifferent);
        assert_eq!(ScoreBand::of(29), ScoreBand::VeryDifferent);
        assert_eq!(ScoreBand::of(30), ScoreBand::SomeSimilarity);
        assert_eq!(ScoreBand::of(69), ScoreBand::ModeratelySimilar);
        assert_eq!(ScoreBand::of(70), ScoreBand::Similar);
        assert_eq!(ScoreBand::of(99), ScoreBand::VerySimilar);
        assert_eq!(ScoreBand::of(200), ScoreBand::VerySimilar);
    }

    #[test]
    fn rubric_lists_best_band_first() {
        let rubric = ScoreBand::rubric();
        let lines: Vec<&str> = rubric.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "- 90-100: Very similar in tone, content, and intent");
        assert_eq!(lines[4], "- 0-29: Very different or inappropriate");
    }
}
