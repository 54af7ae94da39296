use jugglegraph_layout::{LayoutResult, Point, PositionedNode};

#[derive(Debug, Clone)]
pub struct AsciiRenderOptions {
    pub max_width: usize,
    pub max_height: usize,
    /// Polyline points per curve when drawing edges.
    pub curve_steps: usize,
}

impl Default for AsciiRenderOptions {
    fn default() -> Self {
        Self {
            max_width: 120,
            max_height: 40,
            curve_steps: 12,
        }
    }
}

/// Draws a layout as text. The ground state's box uses `=` borders and the
/// builder's current state is marked with `>`.
pub fn render_ascii(layout: &LayoutResult, options: &AsciiRenderOptions) -> String {
    if layout.nodes.is_empty() {
        return String::new();
    }

    let bounds = layout.bounds;
    let width = bounds.width().max(1.0);
    let height = bounds.height().max(1.0);
    let scale_x = (width / options.max_width as f32).max(1.0);
    let scale_y = (height / options.max_height as f32).max(1.0);
    let canvas = Canvas {
        origin: Point::new(bounds.min_x, bounds.min_y),
        scale: scale_x.max(scale_y),
    };

    let grid_width = ((width / canvas.scale).ceil() as usize).max(1) + 4;
    let grid_height = ((height / canvas.scale).ceil() as usize).max(1) + 4;
    let mut grid = vec![vec![' '; grid_width]; grid_height];

    // Edges first so nodes appear on top.
    for edge in &layout.edges {
        let points = edge.path.flatten(options.curve_steps);
        for segment in points.windows(2) {
            let (x1, y1) = canvas.map(segment[0]);
            let (x2, y2) = canvas.map(segment[1]);
            draw_line(&mut grid, x1, y1, x2, y2);
        }
        if let Some(end) = edge.path.end() {
            let (x, y) = canvas.map(end);
            put_cell(&mut grid, x, y - 1, 'v');
        }
    }

    for node in &layout.nodes {
        draw_node(&mut grid, node, &canvas);
    }

    // Labels last so throw heights stay readable where they cross a box.
    for edge in &layout.edges {
        if let Some(label) = &edge.path.label {
            let (x, y) = canvas.map(label.anchor);
            let start = x - label.text.chars().count() as i32 / 2;
            for (idx, ch) in label.text.chars().enumerate() {
                put_cell(&mut grid, start + idx as i32, y, ch);
            }
        }
    }

    grid.into_iter()
        .map(|row| row.into_iter().collect::<String>().trim_end().to_string())
        .skip_while(|row| row.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string()
}

struct Canvas {
    origin: Point,
    scale: f32,
}

impl Canvas {
    fn map(&self, point: Point) -> (i32, i32) {
        let x = ((point.x - self.origin.x) / self.scale).round() as i32 + 2;
        let y = ((point.y - self.origin.y) / self.scale).round() as i32 + 2;
        (x, y)
    }
}

fn draw_node(grid: &mut [Vec<char>], node: &PositionedNode, canvas: &Canvas) {
    let (cx, cy) = canvas.map(node.center());
    let label = node.id.as_str();
    let box_width = (label.chars().count() + 2).max(3) as i32;
    let box_height = 3i32;

    let left = cx - box_width / 2;
    let right = left + box_width - 1;
    let top = cy - box_height / 2;
    let bottom = top + box_height - 1;

    let horizontal = if node.is_base { '=' } else { '-' };
    for y in top..=bottom {
        for x in left..=right {
            put_cell(grid, x, y, ' ');
        }
    }
    for x in left..=right {
        put_cell(grid, x, top, horizontal);
        put_cell(grid, x, bottom, horizontal);
    }
    for y in top..=bottom {
        put_cell(grid, left, y, '|');
        put_cell(grid, right, y, '|');
    }
    for (x, y) in [(left, top), (right, top), (left, bottom), (right, bottom)] {
        put_cell(grid, x, y, '+');
    }

    let label_y = top + 1;
    for (idx, ch) in label.chars().enumerate() {
        put_cell(grid, left + 1 + idx as i32, label_y, ch);
    }
    if node.is_current {
        put_cell(grid, left - 1, label_y, '>');
    }
}

fn draw_line(grid: &mut [Vec<char>], x1: i32, y1: i32, x2: i32, y2: i32) {
    if x1 == x2 {
        let (start, end) = if y1 <= y2 { (y1, y2) } else { (y2, y1) };
        for y in start..=end {
            set_cell(grid, x1, y, '|');
        }
        return;
    }

    if y1 == y2 {
        let (start, end) = if x1 <= x2 { (x1, x2) } else { (x2, x1) };
        for x in start..=end {
            set_cell(grid, x, y1, '-');
        }
        return;
    }

    // Short diagonal steps read better as a slash than as a corner.
    if (x2 - x1).abs() == 1 && (y2 - y1).abs() == 1 {
        let ch = if (x2 - x1) == (y2 - y1) { '\\' } else { '/' };
        set_cell(grid, x1, y1, ch);
        set_cell(grid, x2, y2, ch);
        return;
    }

    draw_line(grid, x1, y1, x1, y2);
    draw_line(grid, x1, y2, x2, y2);
    set_cell(grid, x1, y2, '+');
}

/// Writes `ch` unconditionally.
fn put_cell(grid: &mut [Vec<char>], x: i32, y: i32, ch: char) {
    if let Some(cell) = cell_mut(grid, x, y) {
        *cell = ch;
    }
}

/// Writes a line character, merging with whatever line is already there.
fn set_cell(grid: &mut [Vec<char>], x: i32, y: i32, ch: char) {
    if let Some(cell) = cell_mut(grid, x, y) {
        *cell = merge_char(*cell, ch);
    }
}

fn cell_mut(grid: &mut [Vec<char>], x: i32, y: i32) -> Option<&mut char> {
    let x = usize::try_from(x).ok()?;
    let y = usize::try_from(y).ok()?;
    grid.get_mut(y)?.get_mut(x)
}

fn merge_char(existing: char, incoming: char) -> char {
    if existing == ' ' || existing == incoming {
        return incoming;
    }
    match (existing, incoming) {
        ('-', '|') | ('|', '-') => '+',
        ('+', _) | (_, '+') => '+',
        _ => incoming,
    }
}
