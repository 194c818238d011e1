use rand::seq::IndexedRandom;
use crate::google_places::PlaceResult;

pub const NEARBY_RATING_THRESHOLD: f64 = 3.5;
pub const WISH_RATING_THRESHOLD: f64 = 4.0;

/// Places rated at or above `threshold`. Unrated places count as below it.
/// When nothing qualifies the whole list is returned, so a search with
/// results always yields a non-empty pool.
pub fn quality_pool(candidates: &[PlaceResult], threshold: f64) -> Vec<&PlaceResult> {
    let qualified: Vec<&PlaceResult> = candidates
        .iter()
        .filter(|place| place.rating.is_some_and(|rating| rating >= threshold))
        .collect();

    if qualified.is_empty() {
        candidates.iter().collect()
    } else {
        qualified
    }
}

/// Uniform random pick. The thread RNG is not held past this call.
pub fn pick_random<'a>(pool: &[&'a PlaceResult]) -> Option<&'a PlaceResult> {
    pool.choose(&mut rand::rng()).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn place(id: &str, rating: Option<f64>) -> PlaceResult {
        PlaceResult {
            place_id: id.to_string(),
            name: format!("Place {}", id),
            rating,
            user_ratings_total: None,
            price_level: None,
            vicinity: None,
            formatted_address: None,
            opening_hours: None,
        }
    }

    fn ids(pool: &[&PlaceResult]) -> Vec<String> {
        pool.iter().map(|p| p.place_id.clone()).collect()
    }

    #[test]
    fn keeps_only_places_at_or_above_threshold() {
        let places = vec![
            place("a", Some(3.4)),
            place("b", Some(3.5)),
            place("c", None),
            place("d", Some(4.8)),
        ];
        assert_eq!(ids(&quality_pool(&places, NEARBY_RATING_THRESHOLD)), vec!["b", "d"]);
        assert_eq!(ids(&quality_pool(&places, WISH_RATING_THRESHOLD)), vec!["d"]);
    }

    #[test]
    fn falls_back_to_everything_when_nothing_qualifies() {
        let places = vec![place("a", Some(2.0)), place("b", None)];
        assert_eq!(ids(&quality_pool(&places, WISH_RATING_THRESHOLD)), vec!["a", "b"]);
    }

    #[test]
    fn empty_input_gives_empty_pool() {
        assert!(quality_pool(&[], NEARBY_RATING_THRESHOLD).is_empty());
        assert!(pick_random(&[]).is_none());
    }

    #[test]
    fn random_pick_stays_in_pool_and_covers_it() {
        let places = vec![place("a", Some(4.0)), place("b", Some(4.1)), place("c", Some(4.2))];
        let pool = quality_pool(&places, NEARBY_RATING_THRESHOLD);

        let mut seen = HashSet::new();
        for _ in 0..500 {
            let picked = pick_random(&pool).unwrap();
            assert!(pool.iter().any(|p| p.place_id == picked.place_id));
            seen.insert(picked.place_id.clone());
        }
        assert_eq!(seen.len(), 3);
    }
}
