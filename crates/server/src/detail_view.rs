//! The detail view returned by `GET /item/:id`.

use serde::Serialize;

use catalog::{ItemId, MovieDetail, Platform, available_platforms, display_names, image_url};

use crate::enrichment::Enrichment;

/// Cast members shown on the detail view
pub const CAST_LIMIT: usize = 6;

const POSTER_SIZE: &str = "w500";
const PROFILE_SIZE: &str = "w185";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailView {
    pub id: ItemId,
    pub title: String,
    /// Release year, empty when unknown
    pub year: String,
    /// "{n}분", empty when unknown
    pub runtime: String,
    /// Genre names joined with " · "
    pub genre: String,
    pub rating: f32,
    pub poster_url: Option<String>,
    pub commentary: String,
    pub platforms: Vec<Platform>,
    pub plot: String,
    pub excerpts: Vec<String>,
    pub cast: Vec<CastView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CastView {
    pub name: String,
    pub character: String,
    pub photo: Option<String>,
}

impl DetailView {
    pub fn assemble(detail: &MovieDetail, enrichment: Enrichment) -> Self {
        let genre = if detail.genres.is_empty() {
            String::new()
        } else if detail.genres.iter().all(|g| !g.name.is_empty()) {
            detail
                .genres
                .iter()
                .map(|g| g.name.as_str())
                .collect::<Vec<_>>()
                .join(" · ")
        } else {
            display_names(&detail.genre_ids())
        };

        Self {
            id: detail.id,
            title: detail.title.clone(),
            year: detail.year().unwrap_or_default().to_string(),
            runtime: detail
                .runtime_minutes
                .map(|minutes| format!("{}분", minutes))
                .unwrap_or_default(),
            genre,
            rating: detail.rating,
            poster_url: detail.poster_ref.as_deref().map(|r| image_url(POSTER_SIZE, r)),
            commentary: enrichment.commentary,
            platforms: available_platforms(&detail.watch_providers),
            plot: detail.overview.clone(),
            excerpts: enrichment.excerpts,
            cast: detail
                .cast
                .iter()
                .take(CAST_LIMIT)
                .map(|member| CastView {
                    name: member.name.clone(),
                    character: member.character.clone(),
                    photo: member.profile_ref.as_deref().map(|r| image_url(PROFILE_SIZE, r)),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog::{CastMember, GenreTag};
    use std::collections::HashMap;

    fn detail() -> MovieDetail {
        MovieDetail {
            id: 550,
            title: "파이트 클럽".into(),
            overview: "불면증에 시달리는 회사원...".into(),
            poster_ref: Some("/fc.jpg".into()),
            release_date: Some("1999-10-15".into()),
            rating: 8.4,
            runtime_minutes: Some(139),
            genres: vec![GenreTag {
                id: 18,
                name: "드라마".into(),
            }],
            cast: (0..8)
                .map(|i| CastMember {
                    name: format!("Actor {}", i),
                    character: format!("Role {}", i),
                    profile_ref: (i % 2 == 0).then(|| format!("/a{}.jpg", i)),
                })
                .collect(),
            watch_providers: HashMap::new(),
            reviews: vec![],
        }
    }

    fn enrichment() -> Enrichment {
        Enrichment {
            item_id: 550,
            commentary: "첫 번째 규칙은 말하지 않는 것 🤫".into(),
            excerpts: vec!["a".into(), "b".into(), "c".into()],
        }
    }

    #[test]
    fn test_assemble_formats_fields() {
        let view = DetailView::assemble(&detail(), enrichment());
        assert_eq!(view.year, "1999");
        assert_eq!(view.runtime, "139분");
        assert_eq!(view.genre, "드라마");
        assert_eq!(view.poster_url.as_deref(), Some("https://image.tmdb.org/t/p/w500/fc.jpg"));
        assert_eq!(view.cast.len(), CAST_LIMIT);
        assert_eq!(view.cast[0].photo.as_deref(), Some("https://image.tmdb.org/t/p/w185/a0.jpg"));
        assert_eq!(view.cast[1].photo, None);
        assert_eq!(view.commentary, "첫 번째 규칙은 말하지 않는 것 🤫");
    }

    #[test]
    fn test_missing_fields_render_empty() {
        let mut detail = detail();
        detail.release_date = None;
        detail.runtime_minutes = None;
        detail.poster_ref = None;
        detail.genres.clear();

        let view = DetailView::assemble(&detail, enrichment());
        assert_eq!(view.year, "");
        assert_eq!(view.runtime, "");
        assert_eq!(view.genre, "");
        assert!(view.poster_url.is_none());

        let json = serde_json::to_value(&view).unwrap();
        assert!(json["posterUrl"].is_null());
    }

    #[test]
    fn test_unnamed_genres_use_dictionary() {
        let mut detail = detail();
        detail.genres = vec![
            GenreTag { id: 28, name: String::new() },
            GenreTag { id: 18, name: String::new() },
        ];
        let view = DetailView::assemble(&detail, enrichment());
        assert_eq!(view.genre, "액션 · 드라마");
    }
}
