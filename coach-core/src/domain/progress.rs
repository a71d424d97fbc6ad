//! Progress Entities
//!
//! Daily weight/water entries, progress photos and performed workout sets.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entity::Entity;

/// One row per client per day (by convention; not enforced client-side)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub id: Uuid,
    pub client_id: Uuid,
    pub date: NaiveDate,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub water_ml: i32,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ProgressEntry {
    pub fn new(client_id: Uuid, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            client_id,
            date,
            weight_kg: None,
            water_ml: 0,
            notes: None,
        }
    }
}

impl Entity for ProgressEntry {
    type Id = Uuid;
    const TABLE: &'static str = "progress";

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Body position a progress photo was taken from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PhotoPose {
    #[default]
    Front,
    Side,
    Back,
}

impl PhotoPose {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoPose::Front => "front",
            PhotoPose::Side => "side",
            PhotoPose::Back => "back",
        }
    }

    /// Unknown values fall back to the front pose
    pub fn parse(s: &str) -> Self {
        match s {
            "side" => PhotoPose::Side,
            "back" => PhotoPose::Back,
            _ => PhotoPose::Front,
        }
    }

    pub const ALL: [PhotoPose; 3] = [PhotoPose::Front, PhotoPose::Side, PhotoPose::Back];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressPhoto {
    pub id: Uuid,
    pub client_id: Uuid,
    pub date: NaiveDate,
    #[serde(default)]
    pub pose: PhotoPose,
    /// Object path inside the photo bucket
    pub storage_path: String,
    pub url: String,
}

impl Entity for ProgressPhoto {
    type Id = Uuid;
    const TABLE: &'static str = "progress_photos";

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Earliest and latest photo of one pose, for the comparison slider
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoPair {
    pub before: ProgressPhoto,
    pub after: ProgressPhoto,
}

/// Pick the before/after pair for `pose`; None with fewer than two photos
pub fn photo_pair(photos: &[ProgressPhoto], pose: PhotoPose) -> Option<PhotoPair> {
    let mut matching: Vec<&ProgressPhoto> = photos.iter().filter(|p| p.pose == pose).collect();
    if matching.len() < 2 {
        return None;
    }
    matching.sort_by_key(|p| p.date);
    Some(PhotoPair {
        before: matching[0].clone(),
        after: matching[matching.len() - 1].clone(),
    })
}

/// A set the client performed for an exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutLog {
    pub id: Uuid,
    pub client_id: Uuid,
    pub exercise_id: Uuid,
    pub date: NaiveDate,
    pub set_number: i32,
    pub reps: i32,
    #[serde(default)]
    pub weight_kg: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Entity for WorkoutLog {
    type Id = Uuid;
    const TABLE: &'static str = "workout_logs";

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// Summary of weight entries over a range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightTrend {
    pub first: f64,
    pub latest: f64,
    pub latest_date: NaiveDate,
}

impl WeightTrend {
    pub fn change(&self) -> f64 {
        self.latest - self.first
    }

    /// Build from entries in any order; entries without weight are skipped
    pub fn from_entries(entries: &[ProgressEntry]) -> Option<Self> {
        let mut weighed: Vec<(NaiveDate, f64)> = entries
            .iter()
            .filter_map(|e| e.weight_kg.map(|w| (e.date, w)))
            .collect();
        weighed.sort_by_key(|(date, _)| *date);
        let (_, first) = *weighed.first()?;
        let (latest_date, latest) = *weighed.last()?;
        Some(Self { first, latest, latest_date })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn photo(date: NaiveDate, pose: PhotoPose) -> ProgressPhoto {
        ProgressPhoto {
            id: Uuid::new_v4(),
            client_id: Uuid::nil(),
            date,
            pose,
            storage_path: String::new(),
            url: String::new(),
        }
    }

    #[test]
    fn test_weight_trend_orders_by_date() {
        let client = Uuid::new_v4();
        let mut a = ProgressEntry::new(client, day(10));
        a.weight_kg = Some(80.0);
        let mut b = ProgressEntry::new(client, day(2));
        b.weight_kg = Some(83.5);
        let c = ProgressEntry::new(client, day(5));

        let trend = WeightTrend::from_entries(&[a, b, c]).unwrap();
        assert_eq!(trend.first, 83.5);
        assert_eq!(trend.latest, 80.0);
        assert_eq!(trend.latest_date, day(10));
        assert!((trend.change() + 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_weight_trend_empty() {
        assert!(WeightTrend::from_entries(&[]).is_none());
    }

    #[test]
    fn test_photo_pair_picks_extremes_of_pose() {
        let photos = vec![
            photo(day(15), PhotoPose::Front),
            photo(day(1), PhotoPose::Front),
            photo(day(8), PhotoPose::Front),
            photo(day(20), PhotoPose::Side),
        ];
        let pair = photo_pair(&photos, PhotoPose::Front).unwrap();
        assert_eq!(pair.before.date, day(1));
        assert_eq!(pair.after.date, day(15));
        assert!(photo_pair(&photos, PhotoPose::Side).is_none());
    }

    #[test]
    fn test_progress_row_defaults() {
        let json = r#"{"id":"6f1c1a1e-8a53-4c53-9d59-0c1d1b7a0a11","client_id":"6f1c1a1e-8a53-4c53-9d59-0c1d1b7a0a12","date":"2024-03-01"}"#;
        let entry: ProgressEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.water_ml, 0);
        assert_eq!(entry.date, day(1));
    }

    #[test]
    fn test_pose_parse_falls_back_to_front() {
        for pose in PhotoPose::ALL {
            assert_eq!(PhotoPose::parse(pose.as_str()), pose);
        }
        assert_eq!(PhotoPose::parse("profile"), PhotoPose::Front);
    }
}
