use geo::{Centroid, Geometry, Point};
use ndarray::{Array1, Array2};

use crate::{config::LayerParams, error::ScoreError};

/// The spatial entity being scored (a planning subzone, a grid cell, a candidate site).
/// Geometry must already be in the common planar projection.
#[derive(Clone, Debug, PartialEq)]
pub struct EvaluationUnit {
    pub id: String,
    pub geometry: Geometry<f64>,
}

impl EvaluationUnit {
    pub fn new(id: impl Into<String>, geometry: impl Into<Geometry<f64>>) -> Self {
        Self { id: id.into(), geometry: geometry.into() }
    }

    /// Reduce the unit to one coordinate pair: the centroid if areal, the point itself otherwise.
    pub fn representative_point(&self) -> Result<Point<f64>, ScoreError> {
        match &self.geometry {
            Geometry::Point(point) => Ok(*point),
            Geometry::Polygon(_)
            | Geometry::MultiPolygon(_)
            | Geometry::Rect(_)
            | Geometry::Triangle(_) => self.geometry.centroid()
                .ok_or_else(|| ScoreError::EmptyGeometry(self.id.clone())),
            other => Err(ScoreError::UnsupportedGeometry {
                id: self.id.clone(),
                kind: geometry_kind(other),
            }),
        }
    }
}

fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// Representative points of all units as an (n, 2) coordinate array.
pub fn unit_coords(units: &[EvaluationUnit]) -> Result<Array2<f64>, ScoreError> {
    let points = units.iter()
        .map(EvaluationUnit::representative_point)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(coords_array(&points))
}

fn coords_array(points: &[Point<f64>]) -> Array2<f64> {
    Array2::from_shape_fn((points.len(), 2), |(i, axis)| {
        if axis == 0 { points[i].x() } else { points[i].y() }
    })
}

/// A weighted location taking part in one of the gravity sums.
///
/// A missing weight resolves to [`WeightedSite::MISSING`]; each site type
/// picks the value that makes sense for what the weight measures.
pub trait WeightedSite {
    /// Label used in error messages.
    const SET: &'static str;
    /// Weight used when the attribute is absent.
    const MISSING: f64;

    fn location(&self) -> Point<f64>;
    fn weight(&self) -> Option<f64>;
}

/// A residential location weighted by population.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DemandPoint {
    pub location: Point<f64>,
    pub population: Option<f64>,
}

impl DemandPoint {
    pub fn new(location: impl Into<Point<f64>>, population: f64) -> Self {
        Self { location: location.into(), population: Some(population) }
    }
}

impl WeightedSite for DemandPoint {
    const SET: &'static str = "demand";
    // Unknown population adds no demand.
    const MISSING: f64 = 0.0;

    #[inline] fn location(&self) -> Point<f64> { self.location }
    #[inline] fn weight(&self) -> Option<f64> { self.population }
}

/// An existing amenity weighted by capacity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SupplyPoint {
    pub location: Point<f64>,
    pub capacity: Option<f64>,
}

impl SupplyPoint {
    pub fn new(location: impl Into<Point<f64>>, capacity: f64) -> Self {
        Self { location: location.into(), capacity: Some(capacity) }
    }
}

impl WeightedSite for SupplyPoint {
    const SET: &'static str = "supply";
    // One nominal unit per amenity when capacity is unknown.
    const MISSING: f64 = 1.0;

    #[inline] fn location(&self) -> Point<f64> { self.location }
    #[inline] fn weight(&self) -> Option<f64> { self.capacity }
}

/// A point in an accessibility layer (a rail exit, a bus stop).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerPoint {
    pub location: Point<f64>,
    pub weight: Option<f64>,
}

impl LayerPoint {
    /// An unweighted point (weight 1.0).
    pub fn new(location: impl Into<Point<f64>>) -> Self {
        Self { location: location.into(), weight: None }
    }

    pub fn weighted(location: impl Into<Point<f64>>, weight: f64) -> Self {
        Self { location: location.into(), weight: Some(weight) }
    }
}

impl WeightedSite for LayerPoint {
    const SET: &'static str = "accessibility";
    const MISSING: f64 = 1.0;

    #[inline] fn location(&self) -> Point<f64> { self.location }
    #[inline] fn weight(&self) -> Option<f64> { self.weight }
}

/// A named set of accessibility points with its own decay scale and importance multiplier.
#[derive(Clone, Debug, PartialEq)]
pub struct AccessibilityLayer {
    pub name: String,
    pub points: Vec<LayerPoint>,
    pub params: LayerParams,
}

impl AccessibilityLayer {
    pub fn new(name: impl Into<String>, points: Vec<LayerPoint>, params: LayerParams) -> Self {
        Self { name: name.into(), points, params }
    }
}

/// Coordinates and resolved weights of one point set, ready for matrix work.
#[derive(Clone, Debug)]
pub(crate) struct PointSet {
    pub(crate) coords: Array2<f64>, // (n, 2)
    pub(crate) weights: Array1<f64>, // (n,)
}

impl PointSet {
    /// Resolve missing weights and reject negative or non-finite ones.
    pub(crate) fn from_sites<T: WeightedSite>(sites: &[T]) -> Result<Self, ScoreError> {
        let weights = sites.iter().enumerate()
            .map(|(index, site)| match site.weight() {
                None => Ok(T::MISSING),
                Some(value) if value.is_finite() && value >= 0.0 => Ok(value),
                Some(value) => Err(ScoreError::InvalidWeight { set: T::SET.to_string(), index, value }),
            })
            .collect::<Result<Vec<f64>, _>>()?;

        let points = sites.iter().map(T::location).collect::<Vec<_>>();
        Ok(Self { coords: coords_array(&points), weights: Array1::from(weights) })
    }

    #[inline] pub(crate) fn len(&self) -> usize { self.weights.len() }
    #[inline] pub(crate) fn is_empty(&self) -> bool { self.weights.is_empty() }
}
