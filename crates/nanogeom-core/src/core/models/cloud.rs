use nalgebra::{Point3, Vector3};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum CloudError {
    #[error("Species list has {species} entries but position list has {positions}")]
    LengthMismatch { species: usize, positions: usize },
    #[error("Atom index {index} is out of range for a cloud of {len} atoms")]
    IndexOutOfRange { index: usize, len: usize },
}

/// An axis-aligned bounding box in Angstroms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl Aabb {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// A cube of half-width `half` centered on the origin.
    pub fn centered_cube(half: f64) -> Self {
        Self::new(
            Point3::new(-half, -half, -half),
            Point3::new(half, half, half),
        )
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(Self::new(first, first), |acc, p| Self {
            min: acc.min.inf(p),
            max: acc.max.sup(p),
        }))
    }

    pub fn contains(&self, p: &Point3<f64>) -> bool {
        (0..3).all(|i| p[i] >= self.min[i] && p[i] <= self.max[i])
    }

    pub fn union(&self, other: &Aabb) -> Self {
        Self::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    pub fn extents(&self) -> Vector3<f64> {
        self.max - self.min
    }
}

/// An ordered collection of atoms, each a species label plus a position in Angstroms.
///
/// The species and position lists always have equal length, and the derived
/// statistics (centroid and bounding box) are refreshed by every operation that
/// changes either of them. Operations that change the atom count return a new
/// cloud and leave `self` untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct PointCloud {
    species: Vec<String>,
    positions: Vec<Point3<f64>>,
    centroid: Point3<f64>,
    bounds: Option<Aabb>,
}

impl Default for PointCloud {
    fn default() -> Self {
        Self::empty()
    }
}

impl PointCloud {
    /// Builds a cloud from parallel species and position lists.
    ///
    /// Species labels are normalized to lowercase.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError::LengthMismatch`] if the two lists differ in length.
    pub fn new(species: Vec<String>, positions: Vec<Point3<f64>>) -> Result<Self, CloudError> {
        if species.len() != positions.len() {
            return Err(CloudError::LengthMismatch {
                species: species.len(),
                positions: positions.len(),
            });
        }
        let species = species.into_iter().map(|s| s.to_lowercase()).collect();
        Ok(Self::from_parts(species, positions))
    }

    /// Builds a cloud in which every atom carries the same species.
    pub fn uniform(species: &str, positions: Vec<Point3<f64>>) -> Self {
        let label = species.to_lowercase();
        let species = vec![label; positions.len()];
        Self::from_parts(species, positions)
    }

    pub fn empty() -> Self {
        Self::from_parts(Vec::new(), Vec::new())
    }

    fn from_parts(species: Vec<String>, positions: Vec<Point3<f64>>) -> Self {
        let mut cloud = Self {
            species,
            positions,
            centroid: Point3::origin(),
            bounds: None,
        };
        cloud.refresh_stats();
        cloud
    }

    fn refresh_stats(&mut self) {
        self.bounds = Aabb::from_points(&self.positions);
        self.centroid = if self.positions.is_empty() {
            Point3::origin()
        } else {
            let sum = self
                .positions
                .iter()
                .fold(Vector3::zeros(), |acc, p| acc + p.coords);
            Point3::from(sum / self.positions.len() as f64)
        };
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn species(&self) -> &[String] {
        &self.species
    }

    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    pub fn atoms(&self) -> impl Iterator<Item = (&str, &Point3<f64>)> {
        self.species
            .iter()
            .map(String::as_str)
            .zip(self.positions.iter())
    }

    pub fn centroid(&self) -> Point3<f64> {
        self.centroid
    }

    /// The axis-aligned bounding box, or `None` for an empty cloud.
    pub fn bounds(&self) -> Option<Aabb> {
        self.bounds
    }

    /// Returns a new cloud holding the atoms for which `keep` returns `true`,
    /// in their original relative order.
    pub fn filter<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&str, &Point3<f64>) -> bool,
    {
        let (species, positions) = self
            .atoms()
            .filter(|(s, p)| keep(*s, *p))
            .map(|(s, p)| (s.to_string(), *p))
            .unzip();
        Self::from_parts(species, positions)
    }

    /// Returns a new cloud holding the atoms whose entry in `mask` is `true`.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError::LengthMismatch`] if `mask` does not cover every atom.
    pub fn retain_mask(&self, mask: &[bool]) -> Result<Self, CloudError> {
        if mask.len() != self.len() {
            return Err(CloudError::LengthMismatch {
                species: self.len(),
                positions: mask.len(),
            });
        }
        let mut flags = mask.iter();
        Ok(self.filter(|_, _| flags.next().copied().unwrap_or(false)))
    }

    /// Returns a new cloud with the atoms of `other` appended after those of `self`.
    pub fn concat(&self, other: &PointCloud) -> Self {
        let species = self
            .species
            .iter()
            .chain(other.species.iter())
            .cloned()
            .collect();
        let positions = self
            .positions
            .iter()
            .chain(other.positions.iter())
            .copied()
            .collect();
        Self::from_parts(species, positions)
    }

    pub fn translate(&mut self, shift: &Vector3<f64>) {
        for p in &mut self.positions {
            *p += shift;
        }
        self.refresh_stats();
    }

    /// Applies `f` to every position, then refreshes the derived statistics.
    pub fn map_positions<F>(&mut self, f: F)
    where
        F: Fn(&Point3<f64>) -> Point3<f64>,
    {
        for p in &mut self.positions {
            *p = f(p);
        }
        self.refresh_stats();
    }

    /// Changes the species of the atoms at `indices` to `species`.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError::IndexOutOfRange`] without modifying the cloud if any
    /// index is invalid.
    pub fn relabel(&mut self, indices: &[usize], species: &str) -> Result<(), CloudError> {
        let len = self.len();
        if let Some(&index) = indices.iter().find(|&&i| i >= len) {
            return Err(CloudError::IndexOutOfRange { index, len });
        }
        let label = species.to_lowercase();
        for &i in indices {
            self.species[i] = label.clone();
        }
        Ok(())
    }

    /// Number of atoms carrying `species` (case-insensitive).
    pub fn count_species(&self, species: &str) -> usize {
        let label = species.to_lowercase();
        self.species.iter().filter(|s| **s == label).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_cloud() -> PointCloud {
        PointCloud::new(
            vec!["Au".into(), "au".into(), "AG".into()],
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(4.0, 6.0, -3.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn new_rejects_mismatched_lengths() {
        let result = PointCloud::new(vec!["au".into()], vec![]);
        assert_eq!(
            result,
            Err(CloudError::LengthMismatch {
                species: 1,
                positions: 0
            })
        );
    }

    #[test]
    fn new_normalizes_species_to_lowercase() {
        let cloud = sample_cloud();
        assert_eq!(cloud.species(), &["au", "au", "ag"]);
        assert_eq!(cloud.count_species("AU"), 2);
    }

    #[test]
    fn derived_stats_are_computed_on_construction() {
        let cloud = sample_cloud();
        assert_eq!(cloud.centroid(), Point3::new(2.0, 2.0, -1.0));
        let bounds = cloud.bounds().unwrap();
        assert_eq!(bounds.min, Point3::new(0.0, 0.0, -3.0));
        assert_eq!(bounds.max, Point3::new(4.0, 6.0, 0.0));
    }

    #[test]
    fn filter_is_stable_and_leaves_input_untouched() {
        let cloud = sample_cloud();
        let filtered = cloud.filter(|_, p| p.x > 1.0);
        assert_eq!(filtered.len(), 2);
        assert_eq!(filtered.positions()[0], Point3::new(2.0, 0.0, 0.0));
        assert_eq!(filtered.positions()[1], Point3::new(4.0, 6.0, -3.0));
        assert_eq!(filtered.centroid(), Point3::new(3.0, 3.0, -1.5));
        assert_eq!(cloud.len(), 3);
    }

    #[test]
    fn filter_can_produce_a_valid_empty_cloud() {
        let cloud = sample_cloud();
        let filtered = cloud.filter(|_, _| false);
        assert!(filtered.is_empty());
        assert!(filtered.bounds().is_none());
        assert_eq!(filtered.centroid(), Point3::origin());
    }

    #[test]
    fn translate_refreshes_centroid_and_bounds() {
        let mut cloud = sample_cloud();
        cloud.translate(&Vector3::new(1.0, -2.0, 1.0));
        assert_eq!(cloud.centroid(), Point3::new(3.0, 0.0, 0.0));
        assert_eq!(cloud.bounds().unwrap().max, Point3::new(5.0, 4.0, 1.0));
    }

    #[test]
    fn relabel_rejects_out_of_range_indices_without_changes() {
        let mut cloud = sample_cloud();
        let result = cloud.relabel(&[0, 7], "pt");
        assert_eq!(result, Err(CloudError::IndexOutOfRange { index: 7, len: 3 }));
        assert_eq!(cloud.count_species("pt"), 0);

        cloud.relabel(&[0, 2], "Pt").unwrap();
        assert_eq!(cloud.species(), &["pt", "au", "pt"]);
    }

    #[test]
    fn retain_mask_requires_full_coverage() {
        let cloud = sample_cloud();
        assert!(cloud.retain_mask(&[true, false]).is_err());
        let kept = cloud.retain_mask(&[true, false, true]).unwrap();
        assert_eq!(kept.species(), &["au", "ag"]);
    }

    #[test]
    fn concat_appends_atoms_in_order() {
        let a = sample_cloud();
        let b = PointCloud::uniform("Cu", vec![Point3::new(10.0, 0.0, 0.0)]);
        let joined = a.concat(&b);
        assert_eq!(joined.len(), 4);
        assert_eq!(joined.species()[3], "cu");
        assert_eq!(joined.bounds().unwrap().max.x, 10.0);
    }
}
