//! Bounding-box search: cost-optimal cell-set selection and the linear
//! post-filter fetch built on it.

use crate::cell::{Geocell, MAX_GEOCELL_RESOLUTION};
use crate::geometry::distance;
use crate::proximity::{Entity, SearchResult};
use crate::topology::{interpolate, interpolation_count};
use crate::types::{BoundingBox, Point};
use rustc_hash::FxHashSet;

/// The maximum number of geocells to consider for a bounding box search.
pub const MAX_FEASIBLE_BBOX_SEARCH_CELLS: usize = 300;

/// The default bounding-box search cost function: any cell set of at most 16
/// cells is free, anything larger is effectively infinite. Under early
/// stopping this selects the finest resolution whose cell count stays within
/// 16.
pub fn default_cost_function(num_cells: usize, _resolution: usize) -> f64 {
    if num_cells > 16 { f64::INFINITY } else { 0.0 }
}

/// Returns an efficient set of geocells to search for a bounding-box query.
///
/// The returned cells always share one resolution and together cover the box
/// spanned by the max-resolution corner cells. Candidate resolutions start at
/// the longest common prefix of the two corner encodings (any coarser set is
/// just the single ancestor) and grow finer; candidates whose cell count
/// exceeds [`MAX_FEASIBLE_BBOX_SEARCH_CELLS`] are skipped. The search stops
/// early once the injected cost starts rising, which assumes the cost is
/// unimodal in resolution — a contract on `cost_fn`, not a checked property.
///
/// # Examples
///
/// ```rust
/// use geocell::{BoundingBox, bbox_search};
///
/// let bbox = BoundingBox::new(40.75, -73.98, 40.74, -73.99)?;
/// let cells = bbox_search::best_bbox_search_cells(&bbox, bbox_search::default_cost_function);
/// assert!(!cells.is_empty());
/// assert!(cells.iter().all(|c| c.resolution() == cells[0].resolution()));
/// # Ok::<(), geocell::GeocellError>(())
/// ```
pub fn best_bbox_search_cells<F>(bbox: &BoundingBox, cost_fn: F) -> Vec<Geocell>
where
    F: Fn(usize, usize) -> f64,
{
    let cell_ne = Geocell::compute(&bbox.north_east(), MAX_GEOCELL_RESOLUTION);
    let cell_sw = Geocell::compute(&bbox.south_west(), MAX_GEOCELL_RESOLUTION);

    let mut min_cost = f64::MAX;
    let mut min_cost_cell_set: Vec<Geocell> = Vec::new();

    // The common prefix length is the coarsest resolution worth considering.
    let mut min_resolution = 1;
    while min_resolution < MAX_GEOCELL_RESOLUTION
        && cell_ne.as_str()[..min_resolution] == cell_sw.as_str()[..min_resolution]
    {
        min_resolution += 1;
    }

    for cur_resolution in min_resolution..=MAX_GEOCELL_RESOLUTION {
        let cur_ne = cell_ne.truncate(cur_resolution);
        let cur_sw = cell_sw.truncate(cur_resolution);

        let num_cells = interpolation_count(&cur_ne, &cur_sw);
        if num_cells > MAX_FEASIBLE_BBOX_SEARCH_CELLS {
            continue;
        }

        let mut cell_set = interpolate(&cur_ne, &cur_sw);
        cell_set.sort();

        let cost = cost_fn(cell_set.len(), cur_resolution);
        if cost <= min_cost {
            min_cost = cost;
            min_cost_cell_set = cell_set;
        } else {
            if min_cost_cell_set.is_empty() {
                min_cost_cell_set = cell_set;
            }
            // Once the cost starts rising it will not improve again.
            break;
        }
    }

    min_cost_cell_set
}

/// Performs a bounding-box fetch over a list of given entities.
///
/// Selects an efficient set of geocells via [`best_bbox_search_cells`] to
/// pare the candidates down by cell intersection, keeps only entities whose
/// location lies inside the box, then sorts by distance from `center` and
/// truncates to `max_results`.
///
/// This is a straightforward linear scan over `entities`; a real deployment
/// would push the cell intersection into its storage layer instead.
pub fn bounding_box_fetch<E, F>(
    entities: &[E],
    bbox: &BoundingBox,
    center: &Point,
    max_results: usize,
    cost_fn: F,
) -> Vec<SearchResult<E>>
where
    E: Entity + Clone,
    F: Fn(usize, usize) -> f64,
{
    let query_cells: FxHashSet<Geocell> =
        best_bbox_search_cells(bbox, cost_fn).into_iter().collect();

    let mut results: Vec<SearchResult<E>> = entities
        .iter()
        .filter(|entity| {
            entity
                .geocells()
                .iter()
                .any(|cell| query_cells.contains(cell))
        })
        .filter(|entity| bbox.contains(&entity.location()))
        .map(|entity| SearchResult {
            distance: distance(center, &entity.location()),
            entity: entity.clone(),
        })
        .collect();

    results.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results.truncate(max_results);
    results
}
