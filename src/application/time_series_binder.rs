// Channel readings -> line chart configuration
use crate::domain::channel::ChannelReading;
use crate::domain::chart::{
    AreaStyle, AxisLabel, CategoryAxis, ChartBinding, ChartOption, ChartTitle, GridOption,
    ItemStyle, LineSeries, LineStyle, TooltipOption, TooltipTable, ValueAxis,
};
use chrono::FixedOffset;

const SERIES_NAME: &str = "Value";
const AXIS_LABEL_FORMAT: &str = "%H:%M:%S";
const TOOLTIP_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Pure transformation: the same readings always bind to the same chart.
#[derive(Debug, Clone)]
pub struct TimeSeriesBinder {
    offset: FixedOffset,
    line_color: String,
}

impl TimeSeriesBinder {
    pub fn new(offset: FixedOffset, line_color: impl Into<String>) -> Self {
        Self {
            offset,
            line_color: line_color.into(),
        }
    }

    pub fn bind(&self, channel_name: &str, readings: &[ChannelReading]) -> ChartBinding {
        let labels = readings.iter().map(|r| self.axis_label(r)).collect();
        let values = readings.iter().map(|r| r.value).collect();
        let tooltips = readings.iter().map(|r| self.tooltip_text(r)).collect();

        let option = ChartOption {
            title: ChartTitle {
                text: format!("{} - Time Series Data", channel_name),
                left: "center",
            },
            tooltip: TooltipOption { trigger: "axis" },
            grid: GridOption {
                left: "3%",
                right: "4%",
                bottom: "3%",
                contain_label: true,
            },
            x_axis: CategoryAxis {
                kind: "category",
                boundary_gap: false,
                data: labels,
                axis_label: AxisLabel { rotate: 30 },
            },
            y_axis: ValueAxis {
                kind: "value",
                name: SERIES_NAME,
                name_location: "middle",
                name_gap: 40,
            },
            series: vec![LineSeries {
                name: SERIES_NAME.to_string(),
                kind: "line",
                data: values,
                smooth: true,
                symbol: "circle",
                symbol_size: 6,
                item_style: ItemStyle {
                    color: self.line_color.clone(),
                },
                line_style: LineStyle { width: 3 },
                area_style: AreaStyle { opacity: 0.3 },
            }],
        };

        ChartBinding {
            option,
            tooltips: TooltipTable::new(tooltips),
        }
    }

    fn axis_label(&self, reading: &ChannelReading) -> String {
        reading
            .time
            .with_timezone(&self.offset)
            .format(AXIS_LABEL_FORMAT)
            .to_string()
    }

    fn tooltip_text(&self, reading: &ChannelReading) -> String {
        format!(
            "{}<br/>{}: {}",
            reading.time.with_timezone(&self.offset).format(TOOLTIP_TIME_FORMAT),
            SERIES_NAME,
            reading.value
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn readings() -> Vec<ChannelReading> {
        vec![
            ChannelReading::new(Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(), 12.5),
            ChannelReading::new(Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(), 12.7),
            ChannelReading::new(Utc.with_ymd_and_hms(2024, 5, 1, 7, 45, 30).unwrap(), -3.0),
        ]
    }

    fn binder() -> TimeSeriesBinder {
        TimeSeriesBinder::new(FixedOffset::east_opt(2 * 3600).unwrap(), "#5470c6")
    }

    #[test]
    fn test_bind_keeps_input_order_and_duplicates() {
        let binding = binder().bind("Pressure", &readings());
        let option = &binding.option;

        assert_eq!(option.title.text, "Pressure - Time Series Data");
        assert_eq!(option.x_axis.data, vec!["10:00:00", "10:00:00", "09:45:30"]);
        assert_eq!(option.series.len(), 1);
        assert_eq!(option.series[0].data, vec![12.5, 12.7, -3.0]);
        assert!(option.series[0].smooth);
        assert_eq!(option.series[0].symbol, "circle");
        assert_eq!(option.x_axis.axis_label.rotate, 30);
    }

    #[test]
    fn test_bind_is_pure() {
        let b = binder();
        let data = readings();
        assert_eq!(b.bind("Flow", &data), b.bind("Flow", &data));
    }

    #[test]
    fn test_tooltip_index_matches_readings() {
        let data = readings();
        let binding = binder().bind("Flow", &data);
        assert_eq!(binding.tooltips.len(), data.len());

        for (i, reading) in data.iter().enumerate() {
            let text = binding.tooltips.get(i).unwrap();
            let local = reading.time.with_timezone(&FixedOffset::east_opt(2 * 3600).unwrap());
            assert!(text.starts_with(&local.format("%Y-%m-%d %H:%M:%S").to_string()));
            assert!(text.ends_with(&format!("Value: {}", reading.value)));
            assert_eq!(binding.option.series[0].data[i], reading.value);
        }
        assert!(binding.tooltips.get(data.len()).is_none());
    }

    #[test]
    fn test_empty_readings_bind_to_empty_series() {
        let binding = binder().bind("Empty", &[]);
        assert!(binding.option.x_axis.data.is_empty());
        assert!(binding.option.series[0].data.is_empty());
        assert!(binding.tooltips.is_empty());
    }

    #[test]
    fn test_option_serializes_in_echarts_shape() {
        let value = serde_json::to_value(binder().bind("P", &readings()).option).unwrap();
        assert_eq!(value["xAxis"]["type"], "category");
        assert_eq!(value["xAxis"]["boundaryGap"], false);
        assert_eq!(value["series"][0]["symbolSize"], 6);
        assert_eq!(value["series"][0]["areaStyle"]["opacity"], 0.3);
        assert_eq!(value["yAxis"]["nameLocation"], "middle");
    }
}
