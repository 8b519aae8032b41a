//! Page geometry and slicing of a rendered view into page bands.

#![allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)] // pixel <-> point conversions

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Relative slack for float noise when the image height is an exact multiple
/// of the usable page height.
const PAGE_RELATIVE_TOLERANCE: f64 = 1e-9;

/// Page size and margin in PDF points (1/72 inch).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    /// Margin applied on all four sides.
    pub margin: f64,
}

impl PageGeometry {
    /// ISO A4 portrait with a 20pt margin.
    pub const A4: Self = Self {
        width: 595.28,
        height: 841.89,
        margin: 20.0,
    };

    pub fn usable_width(&self) -> f64 {
        2.0f64.mul_add(-self.margin, self.width)
    }

    pub fn usable_height(&self) -> f64 {
        2.0f64.mul_add(-self.margin, self.height)
    }

    pub fn validate(&self) -> Result<()> {
        let finite = self.width.is_finite() && self.height.is_finite() && self.margin.is_finite();
        if !finite || self.margin < 0.0 || self.usable_width() <= 0.0 || self.usable_height() <= 0.0
        {
            return Err(Error::InvalidInput(format!(
                "Page geometry leaves no printable area: {self:?}"
            )));
        }
        Ok(())
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::A4
    }
}

/// One page's slice of the rendered image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBand {
    /// First source pixel row of the slice.
    pub source_top_px: u32,
    /// Number of source pixel rows in the slice.
    pub source_height_px: u32,
    /// Drawn height of the slice on the page.
    pub height_pt: f64,
}

/// Placement of a rendered image across pages.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    /// Drawn width of the image: the usable page width.
    pub image_width_pt: f64,
    /// Full drawn height of the image at that width.
    pub image_height_pt: f64,
    /// One band per page, top to bottom.
    pub bands: Vec<PageBand>,
}

impl PageLayout {
    pub fn page_count(&self) -> usize {
        self.bands.len()
    }
}

/// Number of pages needed for an image `image_height_pt` tall.
///
/// `ceil(image_height / usable_height)`, with at least one page.
pub fn page_count(image_height_pt: f64, geometry: PageGeometry) -> usize {
    let ratio = image_height_pt / geometry.usable_height();
    let nearest = ratio.round();
    let pages = if (ratio - nearest).abs() <= nearest * PAGE_RELATIVE_TOLERANCE {
        nearest
    } else {
        ratio.ceil()
    };
    if pages.is_finite() && pages > 1.0 {
        pages as usize
    } else {
        1
    }
}

/// Scale a `width_px` x `height_px` image to the usable page width and cut it
/// into page-height bands.
pub fn plan_pages(width_px: u32, height_px: u32, geometry: PageGeometry) -> Result<PageLayout> {
    geometry.validate()?;
    if width_px == 0 {
        return Err(Error::InvalidInput(
            "Rendered view has zero width".to_string(),
        ));
    }

    let image_width_pt = geometry.usable_width();
    let px_per_pt = f64::from(width_px) / image_width_pt;
    let image_height_pt = f64::from(height_px) / px_per_pt;
    let usable_height = geometry.usable_height();
    let pages = page_count(image_height_pt, geometry);

    let row_at = |page: usize| -> u32 {
        let row = (page as f64 * usable_height * px_per_pt).round();
        if row >= f64::from(height_px) {
            height_px
        } else {
            row as u32
        }
    };

    let bands = (0..pages)
        .map(|page| {
            let top = row_at(page);
            let bottom = if page + 1 == pages {
                height_px
            } else {
                row_at(page + 1)
            };
            let rows = bottom.saturating_sub(top);
            PageBand {
                source_top_px: top,
                source_height_px: rows,
                height_pt: f64::from(rows) / px_per_pt,
            }
        })
        .collect();

    Ok(PageLayout {
        image_width_pt,
        image_height_pt,
        bands,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expected_pages(height_pt: f64) -> usize {
        let usable = PageGeometry::A4.height - 2.0 * PageGeometry::A4.margin;
        ((height_pt / usable).ceil() as usize).max(1)
    }

    #[test]
    fn a4_usable_area() {
        let geometry = PageGeometry::A4;
        assert!((geometry.usable_width() - 555.28).abs() < 1e-9);
        assert!((geometry.usable_height() - 801.89).abs() < 1e-9);
    }

    #[test]
    fn page_count_matches_ceiling_formula() {
        for height in [1.0, 400.0, 801.0, 802.0, 1603.0, 1700.0, 10_000.0] {
            assert_eq!(
                page_count(height, PageGeometry::A4),
                expected_pages(height),
                "height {height}"
            );
        }

        let usable = PageGeometry::A4.usable_height();
        assert_eq!(page_count(usable * 1.000_000_5, PageGeometry::A4), 2);
        assert_eq!(page_count(usable * 2.000_001, PageGeometry::A4), 3);
    }

    #[test]
    fn page_count_exact_multiple_does_not_add_blank_page() {
        let usable = PageGeometry::A4.usable_height();
        assert_eq!(page_count(usable, PageGeometry::A4), 1);
        assert_eq!(page_count(usable * 3.0, PageGeometry::A4), 3);
        assert_eq!(page_count(usable * 7.0 / 7.0 * 5.0, PageGeometry::A4), 5);
    }

    #[test]
    fn empty_view_still_produces_one_page() {
        assert_eq!(page_count(0.0, PageGeometry::A4), 1);
        let layout = plan_pages(100, 0, PageGeometry::A4).unwrap();
        assert_eq!(layout.page_count(), 1);
        assert_eq!(layout.bands[0].source_height_px, 0);
    }

    #[test]
    fn plan_pages_scales_to_usable_width() {
        let layout = plan_pages(1588, 794, PageGeometry::A4).unwrap();
        assert!((layout.image_width_pt - 555.28).abs() < 1e-9);
        assert!((layout.image_height_pt - 277.64).abs() < 1e-9);
        assert_eq!(layout.page_count(), 1);
    }

    #[test]
    fn plan_pages_bands_cover_every_row_once() {
        let layout = plan_pages(200, 600, PageGeometry::A4).unwrap();
        assert_eq!(layout.page_count(), expected_pages(layout.image_height_pt));
        assert_eq!(layout.page_count(), 3);

        let mut next_row = 0;
        for band in &layout.bands {
            assert_eq!(band.source_top_px, next_row);
            next_row += band.source_height_px;
        }
        assert_eq!(next_row, 600);

        let drawn: f64 = layout.bands.iter().map(|band| band.height_pt).sum();
        assert!((drawn - layout.image_height_pt).abs() < 1e-6);
        assert!(layout.bands[0].height_pt <= PageGeometry::A4.usable_height() + 2.0);
    }

    #[test]
    fn plan_pages_rejects_degenerate_input() {
        assert!(plan_pages(0, 10, PageGeometry::A4).is_err());
        let cramped = PageGeometry {
            width: 30.0,
            height: 30.0,
            margin: 20.0,
        };
        assert!(plan_pages(10, 10, cramped).is_err());
    }
}
