use eframe::egui::Color32;

use crate::network::NodeType;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ThemeKind {
    #[default]
    Dark,
    Light,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
    pub background: Color32,
    pub grid: Color32,
    pub edge: Color32,
    pub highlight: Color32,
    pub selection_ring: Color32,
    pub node_stroke: Color32,
    pub label: Color32,
    pub dim_alpha: f32,
    palette: [Color32; 8],
}

impl Theme {
    pub fn from_kind(kind: ThemeKind) -> Self {
        match kind {
            ThemeKind::Dark => Self::dark(),
            ThemeKind::Light => Self::light(),
        }
    }

    pub fn dark() -> Self {
        Self {
            background: Color32::from_rgb(19, 23, 29),
            grid: Color32::from_rgba_unmultiplied(60, 70, 80, 70),
            edge: Color32::from_rgba_unmultiplied(150, 160, 175, 150),
            highlight: Color32::from_rgb(245, 166, 35),
            selection_ring: Color32::from_rgb(245, 206, 93),
            node_stroke: Color32::from_rgba_unmultiplied(15, 15, 15, 190),
            label: Color32::from_gray(238),
            dim_alpha: 0.2,
            palette: Self::TABLEAU,
        }
    }

    pub fn light() -> Self {
        Self {
            background: Color32::from_rgb(248, 248, 246),
            grid: Color32::from_rgba_unmultiplied(200, 200, 196, 90),
            edge: Color32::from_rgba_unmultiplied(110, 110, 120, 140),
            highlight: Color32::from_rgb(214, 96, 18),
            selection_ring: Color32::from_rgb(30, 30, 30),
            node_stroke: Color32::from_rgba_unmultiplied(255, 255, 255, 210),
            label: Color32::from_gray(25),
            dim_alpha: 0.2,
            palette: Self::TABLEAU,
        }
    }

    const TABLEAU: [Color32; 8] = [
        Color32::from_rgb(78, 121, 167),
        Color32::from_rgb(242, 142, 43),
        Color32::from_rgb(225, 87, 89),
        Color32::from_rgb(118, 183, 178),
        Color32::from_rgb(89, 161, 79),
        Color32::from_rgb(237, 201, 72),
        Color32::from_rgb(176, 122, 161),
        Color32::from_rgb(156, 156, 156),
    ];

    pub fn node_color(&self, node_type: NodeType) -> Color32 {
        let slot = match node_type {
            NodeType::Person => 0,
            NodeType::Organization => 1,
            NodeType::Event => 2,
            NodeType::Subject => 3,
            NodeType::Location => 4,
            NodeType::Topic => 5,
            NodeType::Article => 6,
            NodeType::Other => 7,
        };
        self.palette[slot]
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

pub fn scale_alpha(color: Color32, factor: f32) -> Color32 {
    let factor = factor.clamp(0.0, 1.0);
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    Color32::from_rgba_unmultiplied(r, g, b, (a as f32 * factor).round() as u8)
}
