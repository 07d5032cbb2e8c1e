//! Forecast fragment and change-group extraction

use tracing::{debug, trace};

use crate::decode::{
    CloudLayer, ValidPeriod, WeatherToken, decode_cloud_layer, decode_weather_node, decode_wind,
    is_nothing_significant, node_number, whole,
};
use crate::document::Node;
use crate::models::{ChangeGroup, ChangeKind, ForecastFragment, ListUpdate, MAX_VISIBILITY_M};

const FORECAST_BLOCK: &str = "iwxxm:MeteorologicalAerodromeForecast";

const WIND_PATHS: [&[&str]; 2] = [
    &["iwxxm:surfaceWind", "iwxxm:AerodromeSurfaceWindForecast"],
    &["iwxxm:surfaceWind", "iwxxm:AerodromeSurfaceWind"],
];

const VISIBILITY_PATHS: [&[&str]; 3] = [
    &["iwxxm:prevailingVisibility"],
    &["iwxxm:visibility", "iwxxm:prevailingVisibility"],
    &["iwxxm:visibility"],
];

const CLOUD_BLOCKS: [&str; 2] = ["iwxxm:AerodromeCloudForecast", "iwxxm:AerodromeCloud"];

/// Decode one forecast block, recording which fields it states.
///
/// A CAVOK block states every field: maximum visibility, no weather and
/// no cloud.
#[must_use]
pub fn parse_fragment(node: &dyn Node) -> ForecastFragment {
    let cavok = node.flag("cloudAndVisibilityOK");
    let wind = node.first_path(&WIND_PATHS).map(decode_wind);

    if cavok {
        return ForecastFragment {
            wind,
            visibility: Some(MAX_VISIBILITY_M),
            weather: ListUpdate::Cleared,
            clouds: ListUpdate::Cleared,
            cavok: true,
            nsc: false,
        };
    }

    let (clouds, nsc) = parse_clouds(node);

    ForecastFragment {
        wind,
        visibility: node_number(node.first_path(&VISIBILITY_PATHS)).and_then(whole),
        weather: parse_weather(node),
        clouds,
        cavok: false,
        nsc,
    }
}

fn parse_weather(node: &dyn Node) -> ListUpdate<WeatherToken> {
    let entries = node.array("iwxxm:weather");
    if entries.is_empty() {
        return ListUpdate::Untouched;
    }

    let tokens = entries
        .into_iter()
        .filter(|entry| !is_nothing_significant(*entry))
        .filter_map(decode_weather_node)
        .collect();

    ListUpdate::from_list(tokens)
}

fn parse_clouds(node: &dyn Node) -> (ListUpdate<CloudLayer>, bool) {
    let Some(cloud) = node.child("iwxxm:cloud") else {
        return (ListUpdate::Untouched, false);
    };

    if is_nothing_significant(cloud) {
        return (ListUpdate::Cleared, true);
    }

    let layers = cloud
        .first_child(&CLOUD_BLOCKS)
        .map(|block| block.array("iwxxm:layer"))
        .unwrap_or_default()
        .into_iter()
        .filter_map(decode_cloud_layer)
        .collect();

    (ListUpdate::from_list(layers), false)
}

/// Extract every `changeForecast` group, sorted by start time.
///
/// The sort is stable and groups without a start sort first.
#[must_use]
pub fn extract_change_groups(report: &dyn Node) -> Vec<ChangeGroup> {
    let mut groups: Vec<ChangeGroup> = report
        .array("iwxxm:changeForecast")
        .into_iter()
        .map(parse_change_group)
        .collect();

    groups.sort_by_key(|group| group.period.start);
    debug!("Extracted {} change group(s)", groups.len());
    groups
}

fn parse_change_group(group: &dyn Node) -> ChangeGroup {
    let node = group.child(FORECAST_BLOCK).unwrap_or(group);

    let period = ValidPeriod::decode(
        node.child("iwxxm:phenomenonTime")
            .or_else(|| group.child("iwxxm:phenomenonTime")),
    );

    let indicator = change_indicator(node).or_else(|| change_indicator(group));
    let kind = ChangeKind::from_indicator(indicator.unwrap_or_default());

    if let ChangeKind::Other(label) = &kind {
        debug!("Unmapped change indicator {:?}, group is never applied", label);
    }
    trace!(kind = kind.label(), start = ?period.start, end = ?period.end, "Change group");

    ChangeGroup {
        kind,
        period,
        fragment: parse_fragment(node),
    }
}

fn change_indicator(node: &dyn Node) -> Option<&str> {
    node.attribute("changeIndicator")
        .or_else(|| node.text_at(&["iwxxm:changeIndicator"]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::XmlElement;
    use chrono::{TimeZone, Utc};

    fn fragment(xml: &str) -> ForecastFragment {
        let root = XmlElement::parse(xml).unwrap();
        parse_fragment(root.child(FORECAST_BLOCK).unwrap())
    }

    #[test]
    fn test_fragment_records_only_stated_fields() {
        let fragment = fragment(
            r#"<iwxxm:MeteorologicalAerodromeForecast>
                <iwxxm:prevailingVisibility uom="m">3000</iwxxm:prevailingVisibility>
            </iwxxm:MeteorologicalAerodromeForecast>"#,
        );

        assert_eq!(fragment.visibility, Some(3000));
        assert!(fragment.wind.is_none());
        assert_eq!(fragment.weather, ListUpdate::Untouched);
        assert_eq!(fragment.clouds, ListUpdate::Untouched);
        assert!(!fragment.cavok);
    }

    #[test]
    fn test_fragment_with_wind_weather_and_cloud() {
        let fragment = fragment(
            r#"<iwxxm:MeteorologicalAerodromeForecast>
                <iwxxm:surfaceWind><iwxxm:AerodromeSurfaceWindForecast>
                    <iwxxm:meanWindDirection>200</iwxxm:meanWindDirection>
                    <iwxxm:meanWindSpeed uom="[kn_i]">18</iwxxm:meanWindSpeed>
                    <iwxxm:windGustSpeed uom="[kn_i]">30</iwxxm:windGustSpeed>
                </iwxxm:AerodromeSurfaceWindForecast></iwxxm:surfaceWind>
                <iwxxm:weather xlink:href="http://codes.wmo.int/306/4678/SHRA"/>
                <iwxxm:cloud><iwxxm:AerodromeCloudForecast>
                    <iwxxm:layer><iwxxm:CloudLayer>
                        <iwxxm:amount xlink:href="http://codes.wmo.int/49-2/CloudAmountReportedAtAerodrome/SCT"/>
                        <iwxxm:base uom="[ft_i]">2000</iwxxm:base>
                    </iwxxm:CloudLayer></iwxxm:layer>
                </iwxxm:AerodromeCloudForecast></iwxxm:cloud>
            </iwxxm:MeteorologicalAerodromeForecast>"#,
        );

        assert_eq!(fragment.wind.unwrap().raw, "20018G30KT");
        let ListUpdate::Replace(weather) = fragment.weather else {
            panic!("weather should be replaced");
        };
        assert_eq!(weather[0].raw, "SHRA");
        let ListUpdate::Replace(clouds) = fragment.clouds else {
            panic!("clouds should be replaced");
        };
        assert_eq!(clouds[0].raw.as_deref(), Some("SCT020"));
    }

    #[test]
    fn test_nil_weather_and_cloud_are_touched_empty() {
        let fragment = fragment(
            r#"<iwxxm:MeteorologicalAerodromeForecast>
                <iwxxm:weather nilReason="http://codes.wmo.int/common/nil/nothingOfOperationalSignificance"/>
                <iwxxm:cloud nilReason="http://codes.wmo.int/common/nil/nothingOfOperationalSignificance"/>
            </iwxxm:MeteorologicalAerodromeForecast>"#,
        );

        assert_eq!(fragment.weather, ListUpdate::Cleared);
        assert_eq!(fragment.clouds, ListUpdate::Cleared);
        assert!(fragment.nsc);
    }

    #[test]
    fn test_cavok_fragment_states_everything() {
        let fragment = fragment(
            r#"<iwxxm:MeteorologicalAerodromeForecast cloudAndVisibilityOK="true">
                <iwxxm:weather xlink:href="http://codes.wmo.int/306/4678/RA"/>
            </iwxxm:MeteorologicalAerodromeForecast>"#,
        );

        assert!(fragment.cavok);
        assert_eq!(fragment.visibility, Some(9999));
        assert_eq!(fragment.weather, ListUpdate::Cleared);
        assert_eq!(fragment.clouds, ListUpdate::Cleared);
    }

    #[test]
    fn test_change_groups_sorted_with_indicator_fallbacks() {
        let root = XmlElement::parse(
            r#"<iwxxm:TAF>
                <iwxxm:changeForecast>
                    <iwxxm:MeteorologicalAerodromeForecast changeIndicator="TEMPORARY_FLUCTUATIONS">
                        <iwxxm:phenomenonTime><gml:TimePeriod>
                            <gml:beginPosition>2024-03-05T12:00:00Z</gml:beginPosition>
                            <gml:endPosition>2024-03-05T15:00:00Z</gml:endPosition>
                        </gml:TimePeriod></iwxxm:phenomenonTime>
                    </iwxxm:MeteorologicalAerodromeForecast>
                </iwxxm:changeForecast>
                <iwxxm:changeForecast changeIndicator="BECOMING">
                    <iwxxm:phenomenonTime><gml:TimePeriod>
                        <gml:beginPosition>2024-03-05T09:00:00Z</gml:beginPosition>
                        <gml:endPosition>2024-03-05T11:00:00Z</gml:endPosition>
                    </gml:TimePeriod></iwxxm:phenomenonTime>
                    <iwxxm:MeteorologicalAerodromeForecast/>
                </iwxxm:changeForecast>
                <iwxxm:changeForecast>
                    <iwxxm:MeteorologicalAerodromeForecast>
                        <iwxxm:changeIndicator>FROM</iwxxm:changeIndicator>
                    </iwxxm:MeteorologicalAerodromeForecast>
                </iwxxm:changeForecast>
            </iwxxm:TAF>"#,
        )
        .unwrap();

        let groups = extract_change_groups(root.child("iwxxm:TAF").unwrap());
        let kinds: Vec<_> = groups.iter().map(|g| g.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                ChangeKind::Other("FROM".to_string()),
                ChangeKind::Becoming,
                ChangeKind::Temporary,
            ]
        );
        assert_eq!(
            groups[1].period.start,
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 9, 0, 0).unwrap())
        );
        assert!(groups[0].period.start.is_none());
    }
}
