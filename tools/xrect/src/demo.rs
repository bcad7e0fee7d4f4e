use xosera::blitter::FillRect;

/// One-line rectangles marching down the diagonal, each half a pixel wider
/// than the last. Colours cycle through 1..=15.
pub fn staircase(lines: u16) -> impl Iterator<Item = FillRect> {
    (0..lines).map(|y| FillRect::new(y, y, y / 2 + 1, 1, (y % 15) as u8 + 1))
}

/// Parse `x,y,w,h,color`. Numbers may be decimal or `0x` hex.
pub fn parse_rect(s: &str) -> Result<FillRect, String> {
    let fields: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, w, h, c] = fields.as_slice() else {
        return Err(format!("expected x,y,w,h,color, got {:?}", s));
    };

    let color = parse_u16(c)?;
    let color = u8::try_from(color).map_err(|_| format!("color {} does not fit in a byte", color))?;
    Ok(FillRect::new(
        parse_u16(x)?,
        parse_u16(y)?,
        parse_u16(w)?,
        parse_u16(h)?,
        color,
    ))
}

pub fn parse_u16(s: &str) -> Result<u16, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("{:?}: {}", s, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staircase_matches_demo_program() {
        let rects: Vec<FillRect> = staircase(240).collect();
        assert_eq!(rects.len(), 240);
        assert_eq!(rects[0], FillRect::new(0, 0, 1, 1, 1));
        assert_eq!(rects[1], FillRect::new(1, 1, 1, 1, 2));
        assert_eq!(rects[14], FillRect::new(14, 14, 8, 1, 15));
        assert_eq!(rects[15].color, 1);
        assert_eq!(rects[239], FillRect::new(239, 239, 120, 1, 15));
        assert!(rects.iter().all(|r| (1..=15).contains(&r.color)));
    }

    #[test]
    fn parses_rects() {
        assert_eq!(parse_rect("1,2,3,4,5"), Ok(FillRect::new(1, 2, 3, 4, 5)));
        assert_eq!(parse_rect("0x10, 0, 8, 8, 0xFF"), Ok(FillRect::new(16, 0, 8, 8, 255)));
        assert!(parse_rect("1,2,3,4").is_err());
        assert!(parse_rect("1,2,3,4,256").is_err());
        assert!(parse_rect("a,2,3,4,5").is_err());
    }
}
