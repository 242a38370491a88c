use anyhow::{Context, Result};
use clap::ValueEnum;
use geo::{BoundingRect, Coord, Geometry, MapCoords, Rect};
use proj4rs::{proj::Proj as Proj4, transform::transform};

/// WGS84 lon/lat, the CRS of the published source layers.
const WGS84_PROJ4: &str = "+proj=longlat +datum=WGS84 +no_defs +type=crs";

/// Singapore SVY21 / EPSG:3414 (transverse Mercator, metres).
const SVY21_PROJ4: &str = "+proj=tmerc +lat_0=1.36666666666667 +lon_0=103.833333333333 +k=1 \
    +x_0=28001.642 +y_0=38744.572 +ellps=WGS84 +units=m +no_defs +type=crs";

/// How input geometry is brought into a planar, metre-based CRS before scoring.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, ValueEnum)]
pub enum Projection {
    /// Input is already planar metres.
    #[default]
    None,
    /// Lon/lat → SVY21 (EPSG:3414).
    Svy21,
    /// Lon/lat → the UTM zone containing the data's bounding-box centre.
    Utm,
}

/// Build PROJ.4 string for the target UTM CRS, chosen from a lon/lat center.
/// - 326zz (north) / 327zz (south), WGS84 datum
fn utm_proj4(center: Coord<f64>) -> String {
    let zone = (((center.x + 180.0) / 6.0).floor() as i32 + 1).clamp(1, 60) as u32;
    let south = if center.y >= 0.0 { "" } else { " +south" };
    format!("+proj=utm +zone={zone}{south} +datum=WGS84 +units=m +no_defs +type=crs")
}

/// Bounding rectangle of all geometries, if any are non-empty.
pub fn bounds<'a>(geometries: impl IntoIterator<Item = &'a Geometry<f64>>) -> Option<Rect<f64>> {
    geometries.into_iter()
        .filter_map(|geometry| geometry.bounding_rect())
        .reduce(|a, b| Rect::new(
            Coord { x: a.min().x.min(b.min().x), y: a.min().y.min(b.min().y) },
            Coord { x: a.max().x.max(b.max().x), y: a.max().y.max(b.max().y) },
        ))
}

/// Lon/lat → metres coordinate transform.
pub struct Reprojector {
    from: Proj4,
    to: Proj4,
    target: String,
}

impl Reprojector {
    /// Build a transform for `projection`. `None` means no transform is needed.
    /// `extent` (lon/lat) selects the UTM zone.
    pub fn new(projection: Projection, extent: Option<Rect<f64>>) -> Result<Option<Self>> {
        let target = match projection {
            Projection::None => return Ok(None),
            Projection::Svy21 => SVY21_PROJ4.to_string(),
            Projection::Utm => {
                let extent = extent.context("cannot choose a UTM zone for empty input")?;
                utm_proj4(extent.center())
            }
        };

        let from = Proj4::from_proj_string(WGS84_PROJ4)
            .with_context(|| format!("failed to build source PROJ.4: {WGS84_PROJ4}"))?;
        let to = Proj4::from_proj_string(&target)
            .with_context(|| format!("failed to build target PROJ.4: {target}"))?;

        Ok(Some(Self { from, to, target }))
    }

    #[inline] pub fn target(&self) -> &str { &self.target }

    /// Reproject one coordinate (degrees in, metres out).
    pub fn project_coord(&self, coord: Coord<f64>) -> Result<Coord<f64>> {
        let mut point = (coord.x.to_radians(), coord.y.to_radians(), 0.0);
        transform(&self.from, &self.to, &mut point)
            .with_context(|| format!("CRS transform failed at ({}, {})", coord.x, coord.y))?;
        Ok(Coord { x: point.0, y: point.1 })
    }

    /// Reproject a whole geometry.
    pub fn project(&self, geometry: &Geometry<f64>) -> Result<Geometry<f64>> {
        geometry.try_map_coords(|coord| self.project_coord(coord))
    }
}
