// Line chart configuration, serialized in the shape ECharts consumes
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOption {
    pub title: ChartTitle,
    pub tooltip: TooltipOption,
    pub grid: GridOption,
    pub x_axis: CategoryAxis,
    pub y_axis: ValueAxis,
    pub series: Vec<LineSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartTitle {
    pub text: String,
    pub left: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipOption {
    pub trigger: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridOption {
    pub left: &'static str,
    pub right: &'static str,
    pub bottom: &'static str,
    pub contain_label: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryAxis {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub boundary_gap: bool,
    pub data: Vec<String>,
    pub axis_label: AxisLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisLabel {
    pub rotate: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueAxis {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub name: &'static str,
    pub name_location: &'static str,
    pub name_gap: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSeries {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: Vec<f64>,
    pub smooth: bool,
    pub symbol: &'static str,
    pub symbol_size: u32,
    pub item_style: ItemStyle,
    pub line_style: LineStyle,
    pub area_style: AreaStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemStyle {
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    pub width: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AreaStyle {
    pub opacity: f64,
}

/// Hover text per point, indexed exactly like the series data.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TooltipTable {
    entries: Vec<String>,
}

impl TooltipTable {
    pub fn new(entries: Vec<String>) -> Self {
        Self { entries }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A fully bound chart: the option to apply plus its tooltip lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartBinding {
    pub option: ChartOption,
    pub tooltips: TooltipTable,
}
