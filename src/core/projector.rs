use crate::models::{ArtistRecord, AudioFeatures, AudioVector, ProfilePack, TasteSnapshot};
use std::collections::{BTreeMap, HashSet};

/// Trimmed, non-empty genre tags of an artist
pub fn genre_tags(artist: &ArtistRecord) -> impl Iterator<Item = &str> {
    artist
        .genres
        .iter()
        .map(|genre| genre.trim())
        .filter(|genre| !genre.is_empty())
}

/// Count how many artist rows carry each genre tag
pub fn genre_counts(artists: &[ArtistRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for artist in artists {
        for genre in genre_tags(artist) {
            *counts.entry(genre.to_string()).or_insert(0) += 1;
        }
    }
    counts
}

/// Mean of per-track audio features, `None` for an empty slice
pub fn audio_centroid(features: &[AudioFeatures]) -> Option<AudioFeatures> {
    if features.is_empty() {
        return None;
    }

    let n = features.len() as f64;
    let mean = |field: fn(&AudioFeatures) -> f64| features.iter().map(field).sum::<f64>() / n;

    Some(AudioFeatures {
        tempo: mean(|f| f.tempo),
        energy: mean(|f| f.energy),
        valence: mean(|f| f.valence),
        danceability: mean(|f| f.danceability),
        acousticness: mean(|f| f.acousticness),
        loudness: mean(|f| f.loudness),
    })
}

/// Raw audio vector of a snapshot: stored centroid, else derived centroid, else zeros
pub fn audio_vector(snapshot: &TasteSnapshot) -> AudioVector {
    snapshot
        .audio_profile
        .or_else(|| audio_centroid(&snapshot.track_features))
        .unwrap_or_default()
        .to_vector()
}

/// Build the profile pack for a taste snapshot
///
/// Missing data is never an error: an empty snapshot projects to empty sets
/// and an all-zero audio vector.
pub fn project(snapshot: &TasteSnapshot) -> ProfilePack {
    let artist_ids: HashSet<String> = snapshot
        .artists
        .iter()
        .map(|artist| artist.artist_id.clone())
        .collect();

    let genres: HashSet<String> = snapshot
        .artists
        .iter()
        .flat_map(genre_tags)
        .map(str::to_string)
        .collect();

    ProfilePack::new(artist_ids, genres, audio_vector(snapshot))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artist(id: &str, genres: &[&str], rank: u32) -> ArtistRecord {
        ArtistRecord {
            artist_id: id.to_string(),
            artist_name: id.to_uppercase(),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            popularity: 50,
            rank,
        }
    }

    fn features(tempo: f64, energy: f64, loudness: f64) -> AudioFeatures {
        AudioFeatures {
            tempo,
            energy,
            valence: 0.5,
            danceability: 0.5,
            acousticness: 0.5,
            loudness,
        }
    }

    #[test]
    fn test_empty_snapshot_projects_to_default_pack() {
        assert_eq!(project(&TasteSnapshot::default()), ProfilePack::default());
    }

    #[test]
    fn test_project_dedupes_genres() {
        let snapshot = TasteSnapshot {
            artists: vec![
                artist("a1", &["techno", "house"], 1),
                artist("a2", &["house", " ", ""], 2),
            ],
            ..Default::default()
        };

        let pack = project(&snapshot);

        assert_eq!(pack.artist_ids().len(), 2);
        assert_eq!(pack.genres().len(), 2);
        assert!(pack.genres().contains("house"));
    }

    #[test]
    fn test_genre_counts_keys_match_pack_genres() {
        let artists = vec![
            artist("a1", &["techno", "house"], 1),
            artist("a2", &["house"], 2),
            artist("a3", &[" trance "], 3),
        ];
        let snapshot = TasteSnapshot { artists: artists.clone(), ..Default::default() };

        let counts = genre_counts(&artists);
        let keys: HashSet<String> = counts.keys().cloned().collect();

        assert_eq!(&keys, project(&snapshot).genres());
        assert_eq!(counts["house"], 2);
        assert_eq!(counts["trance"], 1);
    }

    #[test]
    fn test_stored_profile_wins_over_track_features() {
        let snapshot = TasteSnapshot {
            audio_profile: Some(features(100.0, 0.2, -8.0)),
            track_features: vec![features(140.0, 0.9, -4.0)],
            ..Default::default()
        };
        assert_eq!(audio_vector(&snapshot)[0], 100.0);
    }

    #[test]
    fn test_centroid_from_track_features() {
        let snapshot = TasteSnapshot {
            track_features: vec![features(100.0, 0.2, -10.0), features(140.0, 0.6, -6.0)],
            ..Default::default()
        };

        let vector = audio_vector(&snapshot);

        assert!((vector[0] - 120.0).abs() < 1e-9);
        assert!((vector[1] - 0.4).abs() < 1e-9);
        assert!((vector[5] + 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_centroid_of_nothing() {
        assert!(audio_centroid(&[]).is_none());
        assert_eq!(audio_vector(&TasteSnapshot::default()), [0.0; 6]);
    }
}
