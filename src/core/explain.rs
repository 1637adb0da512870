//! Per-pair match breakdown.
//!
//! Everything here works on the raw taste snapshots of two users, so the
//! report can name artists and tracks, while the summary is computed from the
//! same projected packs the ranking path uses.

use crate::core::{
    projector::{genre_counts, genre_tags, project},
    scoring::{calculate_match_score, round4},
    similarity::normalize_dimension,
};
use crate::models::{
    ArtistRecord, ArtistSuggestion, AudioDelta, AudioDimension, ExplainReport, ExplainSummary,
    IcebreakerTrack, ProfilePack, RecentActivity, RecentPlay, SharedArtist, SharedGenre,
    TasteSnapshot, TrackRecord,
};
use std::collections::{HashMap, HashSet};

pub const MAX_SUGGESTIONS: usize = 10;
pub const MAX_ICEBREAKERS: usize = 10;
pub const MAX_RECENT_ACTIVITY: usize = 10;

/// Build the full comparison of `me` against `other`
pub fn explain_match(me: &TasteSnapshot, other: &TasteSnapshot) -> ExplainReport {
    let me_pack = project(me);
    let other_pack = project(other);

    let shared_artists = shared_artists(&me.artists, &other.artists);
    let shared_ids: HashSet<&str> = shared_artists.iter().map(|a| a.id.as_str()).collect();

    ExplainReport {
        summary: summarize(&me_pack, &other_pack, shared_artists.len()),
        shared_genres: shared_genres(&me.artists, &other.artists),
        audio_breakdown: audio_breakdown(&me_pack, &other_pack),
        suggestions_new_artists: suggest_new_artists(&me_pack, &other.artists),
        icebreaker_tracks: icebreaker_tracks(&other.tracks, &shared_ids),
        recent_activity: recent_activity(&other.recent_plays, &shared_ids),
        shared_artists,
    }
}

fn summarize(me: &ProfilePack, other: &ProfilePack, shared_artists_count: usize) -> ExplainSummary {
    let score = calculate_match_score(me, other);
    ExplainSummary {
        score: round4(score.composite),
        shared_artists_count,
        genre_overlap: round4(score.genre_overlap),
        audio_affinity: round4(score.audio_affinity),
    }
}

/// Artists in rank order, first row per artist ID wins
fn index_by_id(artists: &[ArtistRecord]) -> HashMap<&str, &ArtistRecord> {
    let mut ranked: Vec<&ArtistRecord> = artists.iter().collect();
    ranked.sort_by_key(|a| a.rank);

    let mut index = HashMap::new();
    for artist in ranked {
        index.entry(artist.artist_id.as_str()).or_insert(artist);
    }
    index
}

/// Artists both users listen to, those near the top of both lists first
pub fn shared_artists(me: &[ArtistRecord], other: &[ArtistRecord]) -> Vec<SharedArtist> {
    let mine = index_by_id(me);
    let theirs = index_by_id(other);

    let mut shared: Vec<SharedArtist> = mine
        .iter()
        .filter_map(|(id, me_row)| {
            let other_row = theirs.get(id)?;
            let name = if me_row.artist_name.is_empty() {
                other_row.artist_name.clone()
            } else {
                me_row.artist_name.clone()
            };
            Some(SharedArtist {
                id: id.to_string(),
                name,
                rank_me: me_row.rank,
                rank_other: other_row.rank,
            })
        })
        .collect();

    let rank_sum = |a: &SharedArtist| u64::from(a.rank_me) + u64::from(a.rank_other);
    shared.sort_by(|a, b| rank_sum(a).cmp(&rank_sum(b)).then_with(|| a.id.cmp(&b.id)));
    shared
}

/// Genres tagged on both users' artists, most frequent overall first
pub fn shared_genres(me: &[ArtistRecord], other: &[ArtistRecord]) -> Vec<SharedGenre> {
    let mine = genre_counts(me);
    let theirs = genre_counts(other);

    let mut shared: Vec<SharedGenre> = mine
        .iter()
        .filter_map(|(genre, &me_count)| {
            theirs.get(genre).map(|&other_count| SharedGenre {
                genre: genre.clone(),
                me_count,
                other_count,
            })
        })
        .collect();

    // counts come out of a BTreeMap, so equal totals stay in name order
    shared.sort_by(|a, b| (b.me_count + b.other_count).cmp(&(a.me_count + a.other_count)));
    shared
}

/// Per-dimension comparison in fixed dimension order
pub fn audio_breakdown(me: &ProfilePack, other: &ProfilePack) -> Vec<AudioDelta> {
    AudioDimension::ALL
        .iter()
        .enumerate()
        .map(|(i, &dimension)| {
            let me_raw = me.audio()[i];
            let other_raw = other.audio()[i];
            let me_normalized = normalize_dimension(dimension, me_raw);
            let other_normalized = normalize_dimension(dimension, other_raw);
            AudioDelta {
                dimension,
                me_raw,
                other_raw,
                me_normalized,
                other_normalized,
                abs_delta_normalized: round4((me_normalized - other_normalized).abs()),
            }
        })
        .collect()
}

/// The other user's artists `me` does not follow, best genre fit first
pub fn suggest_new_artists(me: &ProfilePack, other: &[ArtistRecord]) -> Vec<ArtistSuggestion> {
    let mut ranked: Vec<&ArtistRecord> = other.iter().collect();
    ranked.sort_by_key(|a| a.rank);

    let mut seen = HashSet::new();
    let mut suggestions: Vec<ArtistSuggestion> = ranked
        .into_iter()
        .filter(|artist| !me.artist_ids().contains(&artist.artist_id))
        .filter(|artist| seen.insert(artist.artist_id.as_str()))
        .map(|artist| {
            let mut genres: Vec<String> = Vec::new();
            for tag in genre_tags(artist) {
                if !genres.iter().any(|g| g == tag) {
                    genres.push(tag.to_string());
                }
            }
            let overlap_genres = genres.iter().filter(|g| me.genres().contains(*g)).count();
            ArtistSuggestion {
                id: artist.artist_id.clone(),
                name: artist.artist_name.clone(),
                rank: artist.rank,
                genres,
                overlap_genres,
            }
        })
        .collect();

    // stable: equal overlap keeps the other user's rank order
    suggestions.sort_by(|a, b| b.overlap_genres.cmp(&a.overlap_genres));
    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}

/// The other user's top tracks by shared artists, in rank order
pub fn icebreaker_tracks(tracks: &[TrackRecord], shared_ids: &HashSet<&str>) -> Vec<IcebreakerTrack> {
    let mut ranked: Vec<&TrackRecord> = tracks.iter().collect();
    ranked.sort_by_key(|t| t.rank);

    ranked
        .into_iter()
        .filter(|track| track.artist_ids.iter().any(|id| shared_ids.contains(id.as_str())))
        .take(MAX_ICEBREAKERS)
        .map(|track| IcebreakerTrack {
            id: track.track_id.clone(),
            name: track.track_name.clone(),
            artist_ids: track.artist_ids.clone(),
            rank: track.rank,
        })
        .collect()
}

/// The other user's recent plays by shared artists, in source order
pub fn recent_activity(plays: &[RecentPlay], shared_ids: &HashSet<&str>) -> Vec<RecentActivity> {
    // TODO: order by played_at once the history feed guarantees timestamps
    plays
        .iter()
        .filter(|play| play.artist_ids.iter().any(|id| shared_ids.contains(id.as_str())))
        .take(MAX_RECENT_ACTIVITY)
        .map(|play| RecentActivity {
            id: play.track_id.clone(),
            name: play.track_name.clone(),
            artist_ids: play.artist_ids.clone(),
            played_at: play.played_at,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scoring::shared_artist_count;
    use crate::models::AudioFeatures;

    fn artist(id: &str, genres: &str, rank: u32) -> ArtistRecord {
        ArtistRecord {
            artist_id: id.to_string(),
            artist_name: id.to_uppercase(),
            genres: genres.split(',').map(str::to_string).collect(),
            popularity: 40,
            rank,
        }
    }

    fn track(id: &str, artists: &[&str], rank: u32) -> TrackRecord {
        TrackRecord {
            track_id: id.to_string(),
            track_name: format!("Song {}", id),
            artist_ids: artists.iter().map(|s| s.to_string()).collect(),
            popularity: 50,
            rank,
        }
    }

    fn play(id: &str, artists: &[&str]) -> RecentPlay {
        RecentPlay {
            track_id: id.to_string(),
            track_name: format!("Song {}", id),
            artist_ids: artists.iter().map(|s| s.to_string()).collect(),
            played_at: None,
        }
    }

    fn me_snapshot() -> TasteSnapshot {
        TasteSnapshot {
            artists: vec![artist("a1", "techno,house", 1), artist("a2", "house", 2)],
            audio_profile: Some(AudioFeatures {
                tempo: 120.0,
                energy: 0.8,
                valence: 0.6,
                danceability: 0.7,
                acousticness: 0.1,
                loudness: -6.0,
            }),
            ..Default::default()
        }
    }

    fn other_snapshot() -> TasteSnapshot {
        TasteSnapshot {
            artists: vec![artist("a2", "house", 1), artist("a3", "trance", 2)],
            tracks: vec![track("t2", &["a3"], 2), track("t1", &["a2"], 1)],
            audio_profile: Some(AudioFeatures {
                tempo: 122.0,
                energy: 0.78,
                valence: 0.62,
                danceability: 0.69,
                acousticness: 0.12,
                loudness: -6.5,
            }),
            recent_plays: vec![play("r9", &["a3"]), play("r2", &["a2", "a7"]), play("r1", &["a2"])],
            ..Default::default()
        }
    }

    #[test]
    fn test_explain_basic_pair() {
        let report = explain_match(&me_snapshot(), &other_snapshot());

        assert_eq!(report.summary.shared_artists_count, 1);
        assert!(report.summary.score > 0.0);
        assert_eq!(report.shared_artists[0].id, "a2");
        assert_eq!(report.shared_artists[0].rank_me, 2);
        assert_eq!(report.shared_artists[0].rank_other, 1);

        let icebreakers: Vec<&str> = report.icebreaker_tracks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(icebreakers, vec!["t1"]);

        let recent: Vec<&str> = report.recent_activity.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(recent, vec!["r2", "r1"]);
    }

    #[test]
    fn test_shared_genres_counts_and_order() {
        let me = vec![artist("a1", "techno,house", 1), artist("a2", "house", 2)];
        let other = vec![artist("b1", "house,techno", 1), artist("b2", "jazz", 2)];

        let genres = shared_genres(&me, &other);

        assert_eq!(genres.len(), 2);
        assert_eq!(genres[0], SharedGenre { genre: "house".into(), me_count: 2, other_count: 1 });
        assert_eq!(genres[1].genre, "techno");
    }

    #[test]
    fn test_audio_breakdown_has_six_dimensions_in_order() {
        let report = explain_match(&me_snapshot(), &other_snapshot());

        let dimensions: Vec<AudioDimension> = report.audio_breakdown.iter().map(|d| d.dimension).collect();
        assert_eq!(dimensions, AudioDimension::ALL.to_vec());

        let tempo = &report.audio_breakdown[0];
        assert_eq!(tempo.me_raw, 120.0);
        assert_eq!(tempo.abs_delta_normalized, 0.0143);
    }

    #[test]
    fn test_suggestions_ranked_by_genre_fit() {
        let me = project(&me_snapshot());
        let other = vec![
            artist("x1", "jazz", 1),
            artist("x2", "house,techno", 2),
            artist("a1", "techno", 3),
            artist("x3", "house", 4),
        ];

        let suggestions = suggest_new_artists(&me, &other);

        let ids: Vec<&str> = suggestions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["x2", "x3", "x1"]);
        assert_eq!(suggestions[0].overlap_genres, 2);
    }

    #[test]
    fn test_suggestions_truncated() {
        let other: Vec<ArtistRecord> = (0..25).map(|i| artist(&format!("n{}", i), "pop", i + 1)).collect();
        assert_eq!(suggest_new_artists(&ProfilePack::default(), &other).len(), MAX_SUGGESTIONS);
    }

    #[test]
    fn test_summary_agrees_with_packs() {
        let me = me_snapshot();
        let other = other_snapshot();
        let report = explain_match(&me, &other);

        let score = calculate_match_score(&project(&me), &project(&other));
        assert_eq!(report.summary.score, round4(score.composite));
        assert_eq!(report.summary.shared_artists_count, shared_artist_count(&project(&me), &project(&other)));
    }

    #[test]
    fn test_explain_empty_snapshots() {
        let report = explain_match(&TasteSnapshot::default(), &TasteSnapshot::default());

        assert!(report.shared_artists.is_empty());
        assert!(report.shared_genres.is_empty());
        assert_eq!(report.audio_breakdown.len(), 6);
        assert!(report.icebreaker_tracks.is_empty());
        assert_eq!(report.summary.shared_artists_count, 0);
    }

    #[test]
    fn test_icebreakers_truncated_in_rank_order() {
        let shared: HashSet<&str> = ["a2"].into_iter().collect();
        let tracks: Vec<TrackRecord> = (1..=15u32)
            .rev()
            .map(|rank| track(&format!("t{}", rank), &["a2"], rank))
            .chain(std::iter::once(track("t0", &["a9"], 0)))
            .collect();

        let icebreakers = icebreaker_tracks(&tracks, &shared);

        let ranks: Vec<u32> = icebreakers.iter().map(|t| t.rank).collect();
        assert_eq!(icebreakers.len(), MAX_ICEBREAKERS);
        assert_eq!(ranks, (1..=10).collect::<Vec<u32>>());
    }

    #[test]
    fn test_recent_activity_truncated_in_source_order() {
        let shared: HashSet<&str> = ["a2"].into_iter().collect();
        let plays: Vec<RecentPlay> = (0..15).map(|i| play(&format!("r{}", 14 - i), &["a2"])).collect();

        let recent = recent_activity(&plays, &shared);

        let ids: Vec<&str> = recent.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(recent.len(), MAX_RECENT_ACTIVITY);
        assert_eq!(ids, vec!["r14", "r13", "r12", "r11", "r10", "r9", "r8", "r7", "r6", "r5"]);
    }

    #[test]
    fn test_shared_artist_name_falls_back_to_other() {
        let mut unnamed = artist("a2", "house", 3);
        unnamed.artist_name = String::new();
        let me = vec![unnamed, artist("a1", "techno", 1)];
        let other = vec![artist("a2", "house", 1), artist("a1", "techno", 2)];

        let shared = shared_artists(&me, &other);

        assert_eq!(shared.len(), 2);
        assert_eq!(shared[0].id, "a1");
        assert_eq!(shared[0].name, "A1");
        assert_eq!(shared[1].id, "a2");
        assert_eq!(shared[1].name, "A2");
    }

    #[test]
    fn test_shared_artist_huge_ranks_do_not_overflow() {
        let me = vec![artist("a1", "techno", u32::MAX), artist("a2", "house", 1)];
        let other = vec![artist("a1", "techno", u32::MAX), artist("a2", "house", 1)];

        let shared = shared_artists(&me, &other);

        let ids: Vec<&str> = shared.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a2", "a1"]);
    }
}
