use eframe::egui::{self, Align2, Color32, FontId, Rect, Sense, Ui, Vec2};

use crate::color::ColorMap;
use crate::data::aggregate::SummaryTable;
use crate::ui::format_currency;

// ---------------------------------------------------------------------------
// Hierarchy built from a multi-key summary table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub label: String,
    pub value: f64,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn insert(&mut self, path: &[String], value: f64) {
        self.value += value;
        let Some((head, rest)) = path.split_first() else {
            return;
        };
        let idx = match self.children.iter().position(|c| &c.label == head) {
            Some(i) => i,
            None => {
                self.children.push(TreeNode {
                    label: head.clone(),
                    value: 0.0,
                    children: Vec::new(),
                });
                self.children.len() - 1
            }
        };
        self.children[idx].insert(rest, value);
    }

    fn sort_desc(&mut self) {
        self.children
            .sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.label.cmp(&b.label)));
        self.children.iter_mut().for_each(TreeNode::sort_desc);
    }
}

/// Nest the rows of `table` by their key columns; children are ordered by
/// descending value. Rows with non-positive values take no area.
pub fn build_tree(table: &SummaryTable) -> TreeNode {
    let mut root = TreeNode {
        label: String::new(),
        value: 0.0,
        children: Vec::new(),
    };
    for row in table.rows.iter().filter(|r| r.value > 0.0) {
        root.insert(&row.key, row.value);
    }
    root.sort_desc();
    root
}

/// Split `rect` into strips proportional to `weights`, side by side when
/// `horizontal`, stacked otherwise.
pub fn slice(rect: Rect, weights: &[f64], horizontal: bool) -> Vec<Rect> {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Vec::new();
    }
    let mut offset = 0.0f32;
    weights
        .iter()
        .map(|w| {
            let frac = (w / total) as f32;
            let (min, size) = if horizontal {
                let width = rect.width() * frac;
                (Vec2::new(offset, 0.0), Vec2::new(width, rect.height()))
            } else {
                let height = rect.height() * frac;
                (Vec2::new(0.0, offset), Vec2::new(rect.width(), height))
            };
            offset += if horizontal { size.x } else { size.y };
            Rect::from_min_size(rect.min + min, size)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Painting
// ---------------------------------------------------------------------------

/// Slice-and-dice treemap; the top level is coloured per node and deeper
/// levels fade their ancestor's colour.
pub fn treemap(ui: &mut Ui, table: &SummaryTable, colors: &ColorMap) {
    let tree = build_tree(table);
    let size = Vec2::new(ui.available_width(), 650.0);
    let (rect, response) = ui.allocate_exact_size(size, Sense::hover());
    let painter = ui.painter_at(rect);

    let hover = response.hover_pos();
    let mut hovered: Option<String> = None;

    let weights: Vec<f64> = tree.children.iter().map(|c| c.value).collect();
    for (node, r) in tree.children.iter().zip(slice(rect, &weights, true)) {
        let color = colors.color_for(&node.label);
        paint_node(&painter, node, r, color, 0, true, hover, &mut hovered, "");
    }

    if let Some(text) = hovered {
        response.on_hover_text(text);
    }
}

#[allow(clippy::too_many_arguments)]
fn paint_node(
    painter: &egui::Painter,
    node: &TreeNode,
    rect: Rect,
    color: Color32,
    depth: usize,
    horizontal: bool,
    hover: Option<egui::Pos2>,
    hovered: &mut Option<String>,
    parent_path: &str,
) {
    let path = if parent_path.is_empty() {
        node.label.clone()
    } else {
        format!("{parent_path} / {}", node.label)
    };
    let inner = rect.shrink(1.0);
    let fill = color.gamma_multiply(1.0 - depth as f32 * 0.18);
    painter.rect_filled(inner, 2.0, fill);

    if node.children.is_empty() {
        if hover.is_some_and(|p| inner.contains(p)) {
            *hovered = Some(format!("{path}\nSales: {}", format_currency(node.value)));
        }
    } else {
        let body = Rect::from_min_max(
            inner.min + Vec2::new(2.0, 16.0),
            inner.max - Vec2::splat(2.0),
        );
        if body.width() > 2.0 && body.height() > 2.0 {
            let weights: Vec<f64> = node.children.iter().map(|c| c.value).collect();
            for (child, r) in node.children.iter().zip(slice(body, &weights, !horizontal)) {
                paint_node(painter, child, r, fill, depth + 1, !horizontal, hover, hovered, &path);
            }
        }
    }

    if inner.width() > 40.0 && inner.height() > 14.0 {
        painter.text(
            inner.min + Vec2::new(3.0, 2.0),
            Align2::LEFT_TOP,
            &node.label,
            FontId::proportional(11.0),
            Color32::BLACK,
        );
    }
}
