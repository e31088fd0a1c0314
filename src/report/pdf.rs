//! Minimal PDF writer for single-image report pages.

use std::fmt::Write as _;

use super::ExportError;

const POINTS_PER_MM: f64 = 72.0 / 25.4;
const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

/// Physical page size in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFormat {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PageFormat {
    /// ISO A4, portrait.
    pub const A4: PageFormat = PageFormat {
        width_mm: 210.0,
        height_mm: 297.0,
    };

    fn width_pt(&self) -> f64 {
        self.width_mm * POINTS_PER_MM
    }

    fn height_pt(&self) -> f64 {
        self.height_mm * POINTS_PER_MM
    }
}

impl Default for PageFormat {
    fn default() -> Self {
        Self::A4
    }
}

/// Height at which an image fills `page_width` without distortion.
pub fn display_height(pixel_width: u32, pixel_height: u32, page_width: f64) -> f64 {
    if pixel_width == 0 {
        return 0.0;
    }
    f64::from(pixel_height) * page_width / f64::from(pixel_width)
}

/// RGB image data taken from a PNG file, still deflate-compressed.
#[derive(Debug, Clone)]
pub struct PngImage {
    pub width: u32,
    pub height: u32,
    data: Vec<u8>,
}

impl PngImage {
    /// Pull the compressed pixel stream out of an 8-bit RGB, non-interlaced PNG.
    pub fn from_png(png: &[u8]) -> Result<Self, ExportError> {
        let mut rest = png
            .strip_prefix(&PNG_SIGNATURE)
            .ok_or(ExportError::InvalidImage("missing PNG signature"))?;

        let mut header = None;
        let mut data = Vec::new();

        while rest.len() >= 12 {
            let length = u32::from_be_bytes([rest[0], rest[1], rest[2], rest[3]]) as usize;
            let kind = &rest[4..8];
            let body = rest
                .get(8..8 + length)
                .ok_or(ExportError::InvalidImage("truncated PNG chunk"))?;

            match kind {
                b"IHDR" => {
                    if body.len() < 13 {
                        return Err(ExportError::InvalidImage("short IHDR chunk"));
                    }
                    let width = u32::from_be_bytes([body[0], body[1], body[2], body[3]]);
                    let height = u32::from_be_bytes([body[4], body[5], body[6], body[7]]);
                    let (bit_depth, color_type, interlace) = (body[8], body[9], body[12]);
                    if bit_depth != 8 || color_type != 2 || interlace != 0 {
                        return Err(ExportError::InvalidImage(
                            "expected 8-bit RGB non-interlaced PNG",
                        ));
                    }
                    header = Some((width, height));
                }
                b"IDAT" => data.extend_from_slice(body),
                b"IEND" => break,
                _ => {}
            }

            // length + type + body + crc
            rest = &rest[(12 + length).min(rest.len())..];
        }

        let (width, height) = header.ok_or(ExportError::InvalidImage("missing IHDR chunk"))?;
        if data.is_empty() {
            return Err(ExportError::InvalidImage("missing IDAT chunk"));
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }
}

/// Placement of an image on a page, in millimetres from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x_mm: f64,
    pub y_mm: f64,
    pub width_mm: f64,
    pub height_mm: f64,
}

/// Serialize a one-page document showing `image` at `placement`.
pub fn single_image_document(page: PageFormat, image: &PngImage, placement: Placement) -> Vec<u8> {
    let mut writer = PdfWriter::new();
    let catalog = writer.reserve();
    let pages = writer.reserve();
    let page_id = writer.reserve();
    let content = writer.reserve();
    let xobject = writer.reserve();

    writer.set(
        catalog,
        format!("<< /Type /Catalog /Pages {pages} 0 R >>").into_bytes(),
    );
    writer.set(
        pages,
        format!("<< /Type /Pages /Kids [{page_id} 0 R] /Count 1 >>").into_bytes(),
    );
    writer.set(
        page_id,
        format!(
            "<< /Type /Page /Parent {pages} 0 R /MediaBox [0 0 {} {}] \
             /Resources << /XObject << /Im1 {xobject} 0 R >> >> /Contents {content} 0 R >>",
            number(page.width_pt()),
            number(page.height_pt()),
        )
        .into_bytes(),
    );

    // PDF space starts at the bottom-left corner.
    let width = placement.width_mm * POINTS_PER_MM;
    let height = placement.height_mm * POINTS_PER_MM;
    let x = placement.x_mm * POINTS_PER_MM;
    let y = page.height_pt() - placement.y_mm * POINTS_PER_MM - height;
    let ops = format!(
        "q\n{} 0 0 {} {} {} cm\n/Im1 Do\nQ\n",
        number(width),
        number(height),
        number(x),
        number(y),
    );
    writer.set(content, stream(String::new(), ops.as_bytes()));

    let dict = format!(
        "/Type /XObject /Subtype /Image /Width {w} /Height {h} /ColorSpace /DeviceRGB \
         /BitsPerComponent 8 /Filter /FlateDecode \
         /DecodeParms << /Predictor 15 /Colors 3 /BitsPerComponent 8 /Columns {w} >>",
        w = image.width,
        h = image.height,
    );
    writer.set(xobject, stream(dict, &image.data));

    writer.finish(catalog)
}

fn stream(mut dict: String, data: &[u8]) -> Vec<u8> {
    if !dict.is_empty() {
        dict.push(' ');
    }
    let _ = write!(dict, "/Length {}", data.len());

    let mut out = format!("<< {dict} >>\nstream\n").into_bytes();
    out.extend_from_slice(data);
    out.extend_from_slice(b"\nendstream");
    out
}

/// Format a real number the way PDF expects: no exponent, trimmed zeros.
fn number(value: f64) -> String {
    let text = format!("{value:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text.is_empty() || text == "-" || text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

type ObjectId = usize;

struct PdfWriter {
    objects: Vec<Option<Vec<u8>>>,
}

impl PdfWriter {
    fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    /// Allocate an object number to be filled in later.
    fn reserve(&mut self) -> ObjectId {
        self.objects.push(None);
        self.objects.len()
    }

    fn set(&mut self, id: ObjectId, body: Vec<u8>) {
        self.objects[id - 1] = Some(body);
    }

    fn finish(self, root: ObjectId) -> Vec<u8> {
        let mut out = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
        let mut offsets = Vec::with_capacity(self.objects.len());

        for (index, body) in self.objects.into_iter().enumerate() {
            offsets.push(out.len());
            out.extend_from_slice(format!("{} 0 obj\n", index + 1).as_bytes());
            out.extend_from_slice(&body.unwrap_or_else(|| b"null".to_vec()));
            out.extend_from_slice(b"\nendobj\n");
        }

        let xref = out.len();
        let mut table = format!("xref\n0 {}\n0000000000 65535 f \n", offsets.len() + 1);
        for offset in &offsets {
            let _ = write!(table, "{offset:010} 00000 n \n");
        }
        let _ = write!(
            table,
            "trailer\n<< /Size {} /Root {root} 0 R >>\nstartxref\n{xref}\n%%EOF\n",
            offsets.len() + 1
        );
        out.extend_from_slice(table.as_bytes());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use image::{ImageFormat, Rgb, RgbImage};

    fn encode(width: u32, height: u32) -> Vec<u8> {
        let image = RgbImage::from_pixel(width, height, Rgb([10, 20, 30]));
        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        png
    }

    fn count(haystack: &[u8], needle: &str) -> usize {
        haystack
            .windows(needle.len())
            .filter(|window| *window == needle.as_bytes())
            .count()
    }

    #[test]
    fn test_display_height_keeps_aspect_ratio() {
        assert_eq!(display_height(200, 100, 210.0), 105.0);
        assert_eq!(display_height(100, 300, 210.0), 630.0);
        assert_eq!(display_height(0, 300, 210.0), 0.0);
    }

    #[test]
    fn test_png_image_from_png() {
        let image = PngImage::from_png(&encode(7, 3)).unwrap();
        assert_eq!((image.width, image.height), (7, 3));
        assert!(!image.data.is_empty());
    }

    #[test]
    fn test_png_image_rejects_garbage() {
        assert!(matches!(
            PngImage::from_png(b"not a png"),
            Err(ExportError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(number(595.2755905), "595.276");
        assert_eq!(number(12.0), "12");
        assert_eq!(number(0.0), "0");
        assert_eq!(number(-0.0001), "0");
    }

    #[test]
    fn test_single_image_document_structure() {
        let image = PngImage::from_png(&encode(4, 2)).unwrap();
        let placement = Placement {
            x_mm: 0.0,
            y_mm: 0.0,
            width_mm: 210.0,
            height_mm: 105.0,
        };
        let pdf = single_image_document(PageFormat::A4, &image, placement);

        assert!(pdf.starts_with(b"%PDF-1.4"));
        assert!(pdf.ends_with(b"%%EOF\n"));
        assert_eq!(count(&pdf, "/Type /Page "), 1);
        assert_eq!(count(&pdf, "/Subtype /Image"), 1);
        assert_eq!(count(&pdf, "/Count 1"), 1);
        assert_eq!(count(&pdf, "/MediaBox [0 0 595.276 841.89]"), 1);
        // Image sits at the top edge: 841.89 - 297.638 = 544.252.
        assert_eq!(count(&pdf, "595.276 0 0 297.638 0 544.252 cm"), 1);
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let image = PngImage::from_png(&encode(2, 2)).unwrap();
        let placement = Placement {
            x_mm: 0.0,
            y_mm: 0.0,
            width_mm: 210.0,
            height_mm: 210.0,
        };
        let pdf = single_image_document(PageFormat::A4, &image, placement);

        let text = String::from_utf8_lossy(&pdf);
        let xref_start = text.rfind("\nxref\n").unwrap() + 1;
        let entries: Vec<usize> = text[xref_start..]
            .lines()
            .skip(3)
            .take(5)
            .map(|line| line[..10].parse().unwrap())
            .collect();

        for (index, offset) in entries.iter().enumerate() {
            let expected = format!("{} 0 obj", index + 1);
            assert!(pdf[*offset..].starts_with(expected.as_bytes()));
        }

        let startxref: usize = text
            .lines()
            .skip_while(|line| *line != "startxref")
            .nth(1)
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(startxref, pdf.len() - text[xref_start..].len());
    }
}
