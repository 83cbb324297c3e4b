//! Greedy expanding-radius proximity search.
//!
//! The engine starts from the max-resolution geocell containing the query
//! center and repeatedly widens a rectangular, uniform-resolution frontier of
//! cells — one cell, then two, then a 2x2 block, then the parents — querying
//! the injected entity finder for each new frontier and merging results by
//! ascending distance. It stops as soon as geometry proves that no unsearched
//! region can hold a closer result: the nearest edge of the searched
//! rectangle is a lower bound on the distance of any entity outside it.

use crate::cell::{Geocell, MAX_GEOCELL_RESOLUTION};
use crate::error::{GeocellError, Result};
use crate::geometry::{distance, distance_sorted_edges};
use crate::merge::merge_in_place;
use crate::types::Point;
use log::{debug, trace};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A stored object the proximity search can rank.
///
/// Entities stay owned by the caller; the engine only reads the stable
/// identity (used to prune duplicates when a frontier overlaps an earlier
/// query) and the location.
pub trait Entity {
    /// Stable identity for duplicate pruning across finder calls.
    fn key(&self) -> &str;

    /// The entity's location.
    fn location(&self) -> Point;

    /// The geocells this entity is indexed under, one per resolution,
    /// coarsest first. The default derivation from the location is what a
    /// storage layer should persist alongside the entity.
    fn geocells(&self) -> Vec<Geocell> {
        Geocell::generate_geocells(&self.location())
    }
}

/// An entity paired with its computed distance from the query center, in
/// meters.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult<E> {
    /// The matched entity.
    pub entity: E,
    /// Great-circle distance from the query center.
    pub distance: f64,
}

/// Options for [`proximity_fetch`].
///
/// ```rust
/// use geocell::ProximityOptions;
///
/// let options = ProximityOptions::default()
///     .with_max_results(5)
///     .with_max_distance(500.0);
/// assert_eq!(options.max_results, 5);
///
/// // Options are serde-loadable; absent fields keep their defaults.
/// let from_json = ProximityOptions::from_json(r#"{"max_distance": 500.0}"#).unwrap();
/// assert_eq!(from_json.max_results, 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProximityOptions {
    /// Maximum number of results to return (default 10).
    #[serde(default = "ProximityOptions::default_max_results")]
    pub max_results: usize,

    /// Maximum search distance in meters; `None` means unbounded.
    #[serde(default)]
    pub max_distance: Option<f64>,
}

impl ProximityOptions {
    const fn default_max_results() -> usize {
        10
    }

    /// Set the maximum number of results.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Bound the search to a maximum distance in meters.
    pub fn with_max_distance(mut self, max_distance: f64) -> Self {
        self.max_distance = Some(max_distance);
        self
    }

    /// Validate option values.
    pub fn validate(&self) -> Result<()> {
        if self.max_results == 0 {
            return Err(GeocellError::InvalidOptions(
                "max_results must be greater than zero".to_string(),
            ));
        }
        if let Some(max_distance) = self.max_distance
            && !(max_distance > 0.0 && max_distance.is_finite())
        {
            return Err(GeocellError::InvalidOptions(
                "max_distance must be positive and finite".to_string(),
            ));
        }
        Ok(())
    }

    /// Load options from a JSON string, validating the values.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)
            .map_err(|e| GeocellError::InvalidOptions(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }
}

impl Default for ProximityOptions {
    fn default() -> Self {
        Self {
            max_results: Self::default_max_results(),
            max_distance: None,
        }
    }
}

/// Performs a proximity fetch around `center` using the given entity finder.
///
/// Returns at most `options.max_results` entities ordered by ascending
/// distance from `center`, each within `options.max_distance` when set. The
/// finder receives a deduplicated list of same-resolution geocells and must
/// return every entity whose stored geocell set intersects them; the engine
/// trusts its membership answers. At most one finder call is outstanding at
/// a time, and a finder error aborts the search immediately, discarding any
/// partial results.
///
/// # Examples
///
/// ```rust
/// use geocell::{Entity, Geocell, Point, ProximityOptions, proximity_fetch};
///
/// #[derive(Clone)]
/// struct Place {
///     key: String,
///     location: Point,
/// }
///
/// impl Entity for Place {
///     fn key(&self) -> &str {
///         &self.key
///     }
///     fn location(&self) -> Point {
///         self.location
///     }
/// }
///
/// let places = vec![Place {
///     key: "flatiron".into(),
///     location: Point::new(40.7407092, -73.9894039)?,
/// }];
///
/// let center = Point::new(40.7407092, -73.9894039)?;
/// let options = ProximityOptions::default().with_max_results(5);
/// let results = proximity_fetch(&center, &options, |cells| {
///     // A real finder would query storage; here, scan the fixture.
///     Ok(places
///         .iter()
///         .filter(|p| p.geocells().iter().any(|g| cells.contains(g)))
///         .cloned()
///         .collect())
/// })?;
/// assert_eq!(results[0].entity.key, "flatiron");
/// # Ok::<(), geocell::GeocellError>(())
/// ```
///
/// # Errors
///
/// Returns [`GeocellError::InvalidOptions`] for rejected options, or the
/// finder's error unchanged.
pub fn proximity_fetch<E, F>(
    center: &Point,
    options: &ProximityOptions,
    mut entity_finder: F,
) -> Result<Vec<SearchResult<E>>>
where
    E: Entity,
    F: FnMut(&[Geocell]) -> Result<Vec<E>>,
{
    options.validate()?;
    let max_results = options.max_results;
    let max_distance = options.max_distance;

    let mut results: Vec<SearchResult<E>> = Vec::new();
    let mut searched_cells: FxHashSet<Geocell> = FxHashSet::default();

    // The max-resolution cell containing the center; the frontier must stay
    // a rectangle of same-resolution cells with this cell's ancestor inside.
    let mut cur_containing_geocell = Geocell::compute(center, MAX_GEOCELL_RESOLUTION);
    let mut cur_geocells = vec![cur_containing_geocell.clone()];

    // Nearest edge distance of the frontier queried in the previous
    // iteration; a lower bound on anything not yet searched.
    let mut closest_possible_next_result_dist = 0.0_f64;

    loop {
        if cur_geocells.is_empty() {
            break;
        }
        trace!(
            "closest possible next result: {closest_possible_next_result_dist:.1} m over {} cells",
            cur_geocells.len()
        );
        if max_distance.is_some_and(|max| closest_possible_next_result_dist > max) {
            break;
        }

        let mut cur_geocells_unique: Vec<Geocell> = Vec::new();
        for cell in &cur_geocells {
            if !searched_cells.contains(cell) && !cur_geocells_unique.contains(cell) {
                cur_geocells_unique.push(cell.clone());
            }
        }

        let found = entity_finder(&cur_geocells_unique)?;
        searched_cells.extend(cur_geocells.iter().cloned());

        // Pair each entity with its distance from the center, closest first.
        let mut new_results: Vec<SearchResult<E>> = found
            .into_iter()
            .map(|entity| SearchResult {
                distance: distance(center, &entity.location()),
                entity,
            })
            .collect();
        new_results.sort_by(cmp_by_distance);
        new_results.truncate(max_results);

        // Merge the smaller batch into the larger one, pruning entities
        // already seen from an overlapping earlier frontier.
        results = if results.len() > new_results.len() {
            merge_in_place(vec![results, new_results], cmp_by_distance, Some(dup_by_key))
        } else {
            merge_in_place(vec![new_results, results], cmp_by_distance, Some(dup_by_key))
        };
        results.truncate(max_results);

        let sorted_edges = distance_sorted_edges(&cur_geocells, center);

        // Widen the frontier for the next round.
        let mut zoom_out = false;
        if results.is_empty() || cur_geocells.len() == 4 {
            // No results yet (skip adjacents, go straight to the parents) or
            // a full 2x2 block has been searched.
            zoom_out = true;
        } else if cur_geocells.len() == 1 {
            // Grow to 2: add the neighbor past the nearest edge. The nearest
            // edge can point past a pole; the next-nearest always resolves
            // since east/west neighbors exist everywhere.
            let neighbor = sorted_edges
                .iter()
                .find_map(|&(direction, _)| cur_geocells[0].adjacent(direction));
            match neighbor {
                Some(cell) => cur_geocells.push(cell),
                None => zoom_out = true,
            }
        } else if cur_geocells.len() == 2 {
            // Grow to 4: complete the 2x2 block perpendicular to the
            // containing cell's nearest edge.
            let nearest_edge =
                distance_sorted_edges(std::slice::from_ref(&cur_containing_geocell), center)[0].0;
            let perpendicular = sorted_edges
                .iter()
                .map(|&(direction, _)| direction)
                .find(|direction| direction.is_vertical() != nearest_edge.is_vertical());

            let expansion: Option<Vec<Geocell>> = perpendicular.and_then(|direction| {
                cur_geocells
                    .iter()
                    .map(|cell| cell.adjacent(direction))
                    .collect()
            });
            match expansion {
                Some(mut cells) => cur_geocells.append(&mut cells),
                // Both perpendicular neighbors are past a pole; a partial
                // block would break the rectangle invariant.
                None => zoom_out = true,
            }
        }

        if zoom_out {
            let Some(parent) = cur_containing_geocell.parent() else {
                // Top of the hierarchy; everywhere has been searched.
                break;
            };
            cur_containing_geocell = parent;

            let mut parents: Vec<Geocell> = Vec::new();
            for cell in &cur_geocells {
                if let Some(parent) = cell.parent()
                    && !parents.contains(&parent)
                {
                    parents.push(parent);
                }
            }
            if parents.is_empty() {
                break;
            }
            cur_geocells = parents;
        }

        if results.len() < max_results {
            debug!(
                "have {} results, want {max_results}, continuing search",
                results.len()
            );
            closest_possible_next_result_dist = sorted_edges[0].1;
            continue;
        }

        // If the max_results'th closest result is nearer than anything that
        // could lie outside the searched rectangle, the search is complete.
        let current_farthest_returnable_result_dist =
            distance(center, &results[max_results - 1].entity.location());
        if closest_possible_next_result_dist >= current_farthest_returnable_result_dist {
            debug!(
                "done: next result at least {closest_possible_next_result_dist:.1} m away, \
                 farthest returnable is {current_farthest_returnable_result_dist:.1} m"
            );
            break;
        }
        closest_possible_next_result_dist = sorted_edges[0].1;
    }

    debug!("proximity query looked in {} geocells", searched_cells.len());

    results.truncate(max_results);
    if let Some(max) = max_distance {
        results.retain(|result| result.distance <= max);
    }
    Ok(results)
}

fn cmp_by_distance<E>(a: &SearchResult<E>, b: &SearchResult<E>) -> Ordering {
    a.distance.partial_cmp(&b.distance).unwrap_or(Ordering::Equal)
}

fn dup_by_key<E: Entity>(a: &SearchResult<E>, b: &SearchResult<E>) -> bool {
    a.entity.key() == b.entity.key()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Place {
        key: &'static str,
        location: Point,
    }

    impl Entity for Place {
        fn key(&self) -> &str {
            self.key
        }
        fn location(&self) -> Point {
            self.location
        }
    }

    fn place(key: &'static str, lat: f64, lon: f64) -> Place {
        Place {
            key,
            location: Point::new(lat, lon).unwrap(),
        }
    }

    fn scan_finder(places: Vec<Place>) -> impl FnMut(&[Geocell]) -> Result<Vec<Place>> {
        move |cells: &[Geocell]| {
            let requested: FxHashSet<&Geocell> = cells.iter().collect();
            Ok(places
                .iter()
                .filter(|p| p.geocells().iter().any(|g| requested.contains(g)))
                .cloned()
                .collect())
        }
    }

    #[test]
    fn test_options_defaults_and_validation() {
        let options = ProximityOptions::default();
        assert_eq!(options.max_results, 10);
        assert!(options.max_distance.is_none());
        assert!(options.validate().is_ok());

        assert!(options.with_max_results(0).validate().is_err());
        assert!(
            ProximityOptions::default()
                .with_max_distance(-1.0)
                .validate()
                .is_err()
        );
        assert!(ProximityOptions::from_json(r#"{"max_results": 0}"#).is_err());
    }

    #[test]
    fn test_empty_dataset_returns_empty() {
        let center = Point::new(40.0, -74.0).unwrap();
        let results =
            proximity_fetch(&center, &ProximityOptions::default(), scan_finder(vec![])).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_single_entity_at_center() {
        let center = Point::new(40.7407092, -73.9894039).unwrap();
        let places = vec![place("here", 40.7407092, -73.9894039)];
        let results = proximity_fetch(
            &center,
            &ProximityOptions::default().with_max_results(1),
            scan_finder(places),
        )
        .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entity.key, "here");
        assert_eq!(results[0].distance, 0.0);
    }

    #[test]
    fn test_results_sorted_ascending() {
        let center = Point::new(40.7407092, -73.9894039).unwrap();
        let places = vec![
            place("far", 40.7493672, -73.9817685),
            place("near", 40.7425610, -73.9922670),
            place("center", 40.7407092, -73.9894039),
        ];
        let results = proximity_fetch(
            &center,
            &ProximityOptions::default().with_max_results(10),
            scan_finder(places),
        )
        .unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].entity.key, "center");
        assert_eq!(results[1].entity.key, "near");
        assert_eq!(results[2].entity.key, "far");
        for pair in results.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[test]
    fn test_finder_error_aborts_search() {
        let center = Point::new(40.0, -74.0).unwrap();
        let result: Result<Vec<SearchResult<Place>>> =
            proximity_fetch(&center, &ProximityOptions::default(), |_cells| {
                Err(GeocellError::EntityFinder("backend unavailable".into()))
            });
        assert!(matches!(result, Err(GeocellError::EntityFinder(_))));
    }

    #[test]
    fn test_max_distance_filters_results() {
        let center = Point::new(40.7407092, -73.9894039).unwrap();
        let places = vec![
            place("close", 40.7425610, -73.9922670),
            place("distant", 40.8000000, -73.9000000),
        ];
        let results = proximity_fetch(
            &center,
            &ProximityOptions::default().with_max_distance(500.0),
            scan_finder(places),
        )
        .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entity.key, "close");
        assert!(results[0].distance <= 500.0);
    }

    #[test]
    fn test_duplicates_across_frontiers_pruned() {
        // A finder that reports the same entity for every queried frontier.
        let center = Point::new(40.7407092, -73.9894039).unwrap();
        let entity = place("dup", 40.7425610, -73.9922670);
        let results = proximity_fetch(
            &center,
            &ProximityOptions::default().with_max_results(5),
            |_cells: &[Geocell]| Ok(vec![entity.clone()]),
        )
        .unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_search_near_pole_terminates() {
        // The containing cell sits on the top grid row; growth keeps hitting
        // missing northern neighbors and must fall back to zooming out.
        let center = Point::new(89.99, 45.0).unwrap();
        let places = vec![place("station", 89.98, 44.0)];
        let results = proximity_fetch(
            &center,
            &ProximityOptions::default().with_max_results(2),
            scan_finder(places),
        )
        .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entity.key, "station");
    }

    #[test]
    fn test_at_most_one_result_per_key() {
        let center = Point::new(40.7407092, -73.9894039).unwrap();
        let places = vec![
            place("a", 40.7407092, -73.9894039),
            place("b", 40.7425610, -73.9922670),
        ];
        let results = proximity_fetch(
            &center,
            &ProximityOptions::default(),
            scan_finder(places),
        )
        .unwrap();
        let mut keys: Vec<&str> = results.iter().map(|r| r.entity.key()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), results.len());
    }
}
