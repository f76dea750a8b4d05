use vm8::FrameBuffer;

const ON: char = '█';
const OFF: char = ' ';

/// # Display
/// Renders a Chip-8 FrameBuffer as text, one line per row and one
/// character per pixel, framed so blank edges stay visible.
pub fn render(frame: &FrameBuffer) -> String {
    let width = frame[0].len();
    let border = format!("+{}+\n", "-".repeat(width));

    let mut out = border.clone();
    for row in frame.iter() {
        out.push('|');
        out.extend(row.iter().map(|&p| if p == 1 { ON } else { OFF }));
        out.push_str("|\n");
    }
    out.push_str(&border);
    out
}
