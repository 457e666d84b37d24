//! Genre dictionary.
//!
//! Maps the semantic keywords produced by the intent classifier (English
//! genre names, a few aliases, and Korean genre names) to catalog genre
//! identifiers, and back to display names for the detail view.

use serde::{Deserialize, Serialize};

/// Catalog genres, one variant per TMDB movie genre
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genre {
    Action,
    Adventure,
    Animation,
    Comedy,
    Crime,
    Documentary,
    Drama,
    Family,
    Fantasy,
    History,
    Horror,
    Music,
    Mystery,
    Romance,
    ScienceFiction,
    TvMovie,
    Thriller,
    War,
    Western,
}

impl Genre {
    /// Every genre, in dictionary order
    pub const ALL: [Genre; 19] = [
        Genre::Action,
        Genre::Adventure,
        Genre::Animation,
        Genre::Comedy,
        Genre::Crime,
        Genre::Documentary,
        Genre::Drama,
        Genre::Family,
        Genre::Fantasy,
        Genre::History,
        Genre::Horror,
        Genre::Music,
        Genre::Mystery,
        Genre::Romance,
        Genre::ScienceFiction,
        Genre::TvMovie,
        Genre::Thriller,
        Genre::War,
        Genre::Western,
    ];

    /// The catalog's numeric identifier for this genre
    pub fn catalog_id(self) -> u32 {
        match self {
            Genre::Action => 28,
            Genre::Adventure => 12,
            Genre::Animation => 16,
            Genre::Comedy => 35,
            Genre::Crime => 80,
            Genre::Documentary => 99,
            Genre::Drama => 18,
            Genre::Family => 10751,
            Genre::Fantasy => 14,
            Genre::History => 36,
            Genre::Horror => 27,
            Genre::Music => 10402,
            Genre::Mystery => 9648,
            Genre::Romance => 10749,
            Genre::ScienceFiction => 878,
            Genre::TvMovie => 10770,
            Genre::Thriller => 53,
            Genre::War => 10752,
            Genre::Western => 37,
        }
    }

    pub fn from_catalog_id(id: u32) -> Option<Genre> {
        Genre::ALL.into_iter().find(|g| g.catalog_id() == id)
    }

    /// Canonical English keyword, as the classifier is instructed to emit it
    pub fn keyword(self) -> &'static str {
        match self {
            Genre::Action => "action",
            Genre::Adventure => "adventure",
            Genre::Animation => "animation",
            Genre::Comedy => "comedy",
            Genre::Crime => "crime",
            Genre::Documentary => "documentary",
            Genre::Drama => "drama",
            Genre::Family => "family",
            Genre::Fantasy => "fantasy",
            Genre::History => "history",
            Genre::Horror => "horror",
            Genre::Music => "music",
            Genre::Mystery => "mystery",
            Genre::Romance => "romance",
            Genre::ScienceFiction => "science fiction",
            Genre::TvMovie => "tv movie",
            Genre::Thriller => "thriller",
            Genre::War => "war",
            Genre::Western => "western",
        }
    }

    /// Korean display name used by the detail view
    pub fn korean_name(self) -> &'static str {
        match self {
            Genre::Action => "액션",
            Genre::Adventure => "모험",
            Genre::Animation => "애니메이션",
            Genre::Comedy => "코미디",
            Genre::Crime => "범죄",
            Genre::Documentary => "다큐멘터리",
            Genre::Drama => "드라마",
            Genre::Family => "가족",
            Genre::Fantasy => "판타지",
            Genre::History => "역사",
            Genre::Horror => "공포",
            Genre::Music => "음악",
            Genre::Mystery => "미스터리",
            Genre::Romance => "로맨스",
            Genre::ScienceFiction => "SF",
            Genre::TvMovie => "TV 영화",
            Genre::Thriller => "스릴러",
            Genre::War => "전쟁",
            Genre::Western => "서부",
        }
    }

    /// Extra spellings accepted on top of the keyword and the Korean name
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Genre::Animation => &["animated", "애니"],
            Genre::Comedy => &["funny", "코믹", "웃긴"],
            Genre::Documentary => &["docu", "다큐"],
            Genre::Horror => &["scary", "호러", "무서운"],
            Genre::Romance => &["romantic", "멜로", "로맨틱"],
            Genre::ScienceFiction => &["sci-fi", "scifi", "sf", "에스에프", "공상과학"],
            Genre::Music => &["musical", "뮤지컬"],
            _ => &[],
        }
    }

    /// Every accepted spelling: keyword, Korean name, then aliases
    pub fn terms(self) -> impl Iterator<Item = &'static str> {
        [self.keyword(), self.korean_name()]
            .into_iter()
            .chain(self.aliases().iter().copied())
    }

    /// Resolve one semantic keyword to a genre.
    ///
    /// Matching is case-insensitive and exact on the trimmed keyword;
    /// unrecognized keywords ("popular", "feel-good", ...) return `None`.
    pub fn from_keyword(keyword: &str) -> Option<Genre> {
        let needle = keyword.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        Genre::ALL
            .into_iter()
            .find(|genre| genre.terms().any(|term| term.to_lowercase() == needle))
    }
}

/// Translate keywords to catalog genre ids, dropping unrecognized ones
/// and duplicates while keeping first-seen order.
pub fn resolve_genre_ids<S: AsRef<str>>(keywords: &[S]) -> Vec<u32> {
    let mut ids = Vec::new();
    for keyword in keywords {
        if let Some(genre) = Genre::from_keyword(keyword.as_ref()) {
            let id = genre.catalog_id();
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}

/// Korean display names for a list of catalog genre ids, joined with ` · `
pub fn display_names(genre_ids: &[u32]) -> String {
    genre_ids
        .iter()
        .filter_map(|&id| Genre::from_catalog_id(id))
        .map(Genre::korean_name)
        .collect::<Vec<_>>()
        .join(" · ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup_is_case_insensitive() {
        assert_eq!(Genre::from_keyword("Drama"), Some(Genre::Drama));
        assert_eq!(Genre::from_keyword("  ACTION "), Some(Genre::Action));
        assert_eq!(Genre::from_keyword("Science Fiction"), Some(Genre::ScienceFiction));
    }

    #[test]
    fn test_aliases_and_korean_names() {
        assert_eq!(Genre::from_keyword("sci-fi"), Some(Genre::ScienceFiction));
        assert_eq!(Genre::from_keyword("공포"), Some(Genre::Horror));
        assert_eq!(Genre::from_keyword("애니"), Some(Genre::Animation));
    }

    #[test]
    fn test_mood_keywords_are_not_genres() {
        assert_eq!(Genre::from_keyword("popular"), None);
        assert_eq!(Genre::from_keyword("feel-good"), None);
        assert_eq!(Genre::from_keyword(""), None);
    }

    #[test]
    fn test_resolve_drops_unknown_and_duplicates() {
        let ids = resolve_genre_ids(&["comedy", "popular", "Comedy", "romance"]);
        assert_eq!(ids, vec![35, 10749]);
    }

    #[test]
    fn test_catalog_ids_round_trip() {
        for genre in Genre::ALL {
            assert_eq!(Genre::from_catalog_id(genre.catalog_id()), Some(genre));
        }
    }

    #[test]
    fn test_display_names() {
        assert_eq!(display_names(&[28, 18]), "액션 · 드라마");
        assert_eq!(display_names(&[28, 424242]), "액션");
        assert_eq!(display_names(&[]), "");
    }
}
