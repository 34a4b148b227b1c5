//! Interactive entry of the area to fetch
//!
//! Used when no coordinates are given on the command line. Reads
//! longitude, latitude and zoom, one line each; an empty zoom selects the
//! configured default. End of input before all three lines is an error.

use std::io::{BufRead, Write};

use crate::app::geo::{parse_zoom, validate_zoom, GeoBoundingBox};
use crate::errors::{AppError, Result};

/// Area entered at the prompt
#[derive(Debug, Clone, PartialEq)]
pub struct PromptedArea {
    pub bbox: GeoBoundingBox,
    pub zoom: u8,
}

/// Prompt on `output` and read the area from `input`
///
/// # Errors
///
/// Returns `AppError::Bounds` for invalid coordinates or zoom, and an
/// error if input ends before all values were read
pub fn prompt_area<R, W>(input: &mut R, output: &mut W, default_zoom: u8) -> Result<PromptedArea>
where
    R: BufRead,
    W: Write,
{
    let longitude = read_value(input, output, "Longitude : ")?;
    let latitude = read_value(input, output, "Latitude  : ")?;
    let zoom_label = format!("Zoom [{}]  : ", default_zoom);
    let zoom = read_value(input, output, &zoom_label)?;

    let bbox = GeoBoundingBox::from_ranges(&longitude, &latitude)?;
    let zoom = if zoom.trim().is_empty() {
        validate_zoom(default_zoom)?
    } else {
        parse_zoom(&zoom)?
    };

    Ok(PromptedArea { bbox, zoom })
}

fn read_value<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> Result<String> {
    write!(output, "{}", label)?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        writeln!(output)?;
        return Err(AppError::generic(format!(
            "Input ended while waiting for '{}'",
            label.trim_end_matches([' ', ':'])
        )));
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::errors::BoundsError;

    fn prompt(text: &str) -> (Result<PromptedArea>, String) {
        let mut input = Cursor::new(text.as_bytes().to_vec());
        let mut output = Vec::new();
        let result = prompt_area(&mut input, &mut output, 12);
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_prompt_full_input() {
        let (result, output) = prompt("11.0-11.1\n46.1-46.0\n14\n");
        let area = result.unwrap();

        assert_eq!(area.zoom, 14);
        assert_eq!(area.bbox.lon_min(), 11.0);
        assert_eq!(area.bbox.lat_min(), 46.0);
        assert_eq!(area.bbox.lat_max(), 46.1);
        assert!(output.contains("Longitude : "));
        assert!(output.contains("Latitude  : "));
        assert!(output.contains("Zoom [12]"));
    }

    #[test]
    fn test_prompt_empty_zoom_uses_default() {
        let (result, _) = prompt("11.5\n48.1\n\n");
        assert_eq!(result.unwrap().zoom, 12);
    }

    #[test]
    fn test_prompt_windows_line_endings() {
        let (result, _) = prompt("11.5\r\n48.1\r\n9\r\n");
        assert_eq!(result.unwrap().zoom, 9);
    }

    #[test]
    fn test_prompt_eof_fails() {
        let (result, _) = prompt("11.5\n");
        match result {
            Err(AppError::Generic { message }) => assert!(message.contains("Latitude")),
            other => panic!("Expected end of input error, got {:?}", other),
        }
    }

    #[test]
    fn test_prompt_invalid_latitude() {
        let (result, _) = prompt("11.5\n90\n\n");
        assert!(matches!(
            result,
            Err(AppError::Bounds(BoundsError::LatitudeOutOfRange { .. }))
        ));
    }
}
