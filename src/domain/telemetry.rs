// Chart and KPI tile domain models
use serde::Serialize;

/// One (x, y) pair. `y` is `None` where the underlying metric is undefined so the
/// charting surface draws a gap instead of a zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: String,
    pub y: Option<f64>,
}

impl ChartPoint {
    pub fn new(x: impl Into<String>, y: Option<f64>) -> Self {
        Self { x: x.into(), y }
    }

    pub fn value(x: impl Into<String>, y: f64) -> Self {
        Self::new(x, Some(y))
    }
}

/// A KPI rendered as display text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileData {
    pub id: String,
    pub title: String,
    pub value: Option<f64>,
    pub precision: usize,
    pub text: String,
}

impl TileData {
    pub fn new(id: &str, title: &str, value: Option<f64>, precision: usize) -> Self {
        let text = match value {
            Some(v) => format!("{}: {:.*}", title, precision, v),
            None => format!("{}: n/a", title),
        };
        Self {
            id: id.to_string(),
            title: title.to_string(),
            value,
            precision,
            text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesData {
    pub id: String,
    pub name: String,
    pub points: Vec<ChartPoint>,
}

impl SeriesData {
    pub fn new(id: &str, name: &str, points: Vec<ChartPoint>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            points,
        }
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Sum of all defined y values.
    #[cfg(test)]
    pub fn total(&self) -> f64 {
        self.points.iter().filter_map(|p| p.y).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    Bar,
    Pie,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub id: String,
    pub title: String,
    pub kind: ChartKind,
    pub x_title: Option<String>,
    pub y_title: Option<String>,
    pub series: Vec<SeriesData>,
}

impl ChartData {
    pub fn new(id: &str, title: String, kind: ChartKind, series: Vec<SeriesData>) -> Self {
        Self {
            id: id.to_string(),
            title,
            kind,
            x_title: None,
            y_title: None,
            series,
        }
    }

    pub fn with_axes(mut self, x_title: &str, y_title: &str) -> Self {
        self.x_title = Some(x_title.to_string());
        self.y_title = Some(y_title.to_string());
        self
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.series.iter().all(SeriesData::is_empty)
    }
}
