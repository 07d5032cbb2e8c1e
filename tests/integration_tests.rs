//! Integration tests for AeroWx document decoding and the CLI

use std::io::Write;
use std::process::Command;

use aerowx::decode::{Descriptor, Intensity, Phenomenon};
use aerowx::{TimelineOptions, parse_metar_xml, parse_taf_xml, segment_timeline};
use chrono::{TimeZone, Utc};

const METAR: &str = r#"<iwxxm:METAR xmlns:iwxxm="http://icao.int/iwxxm/3.0" xmlns:gml="http://www.opengis.net/gml/3.2" xmlns:xlink="http://www.w3.org/1999/xlink" automatedStation="false">
  <iwxxm:issueTime><gml:TimeInstant gml:id="ti-1"><gml:timePosition>2024-03-05T06:00:00Z</gml:timePosition></gml:TimeInstant></iwxxm:issueTime>
  <iwxxm:observationTime><gml:TimeInstant gml:id="ti-2"><gml:timePosition>2024-03-05T06:00:00Z</gml:timePosition></gml:TimeInstant></iwxxm:observationTime>
  <iwxxm:aerodrome><aixm:AirportHeliport gml:id="ad-1"><aixm:timeSlice><aixm:AirportHeliportTimeSlice gml:id="ts-1">
    <aixm:designator>RKSI</aixm:designator>
    <aixm:name>INCHEON INTERNATIONAL</aixm:name>
    <aixm:locationIndicatorICAO>RKSI</aixm:locationIndicatorICAO>
  </aixm:AirportHeliportTimeSlice></aixm:timeSlice></aixm:AirportHeliport></iwxxm:aerodrome>
  <iwxxm:observation><iwxxm:MeteorologicalAerodromeObservation>
    <iwxxm:airTemperature uom="Cel">-2</iwxxm:airTemperature>
    <iwxxm:dewpointTemperature uom="Cel">-5</iwxxm:dewpointTemperature>
    <iwxxm:qnh uom="hPa">1021</iwxxm:qnh>
    <iwxxm:surfaceWind><iwxxm:AerodromeSurfaceWind>
      <iwxxm:meanWindDirection uom="deg">330</iwxxm:meanWindDirection>
      <iwxxm:meanWindSpeed uom="[kn_i]">22</iwxxm:meanWindSpeed>
      <iwxxm:windGustSpeed uom="[kn_i]">34</iwxxm:windGustSpeed>
    </iwxxm:AerodromeSurfaceWind></iwxxm:surfaceWind>
    <iwxxm:visibility><iwxxm:AerodromeHorizontalVisibility>
      <iwxxm:prevailingVisibility uom="m">2500</iwxxm:prevailingVisibility>
    </iwxxm:AerodromeHorizontalVisibility></iwxxm:visibility>
    <iwxxm:presentWeather xlink:href="http://codes.wmo.int/306/4678/-SHSN"/>
    <iwxxm:cloud><iwxxm:AerodromeCloud>
      <iwxxm:layer><iwxxm:CloudLayer>
        <iwxxm:amount xlink:href="http://codes.wmo.int/49-2/CloudAmountReportedAtAerodrome/FEW"/>
        <iwxxm:base uom="[ft_i]">1500</iwxxm:base>
      </iwxxm:CloudLayer></iwxxm:layer>
      <iwxxm:layer><iwxxm:CloudLayer>
        <iwxxm:amount xlink:href="http://codes.wmo.int/49-2/CloudAmountReportedAtAerodrome/BKN"/>
        <iwxxm:base uom="[ft_i]">3500</iwxxm:base>
      </iwxxm:CloudLayer></iwxxm:layer>
    </iwxxm:AerodromeCloud></iwxxm:cloud>
  </iwxxm:MeteorologicalAerodromeObservation></iwxxm:observation>
</iwxxm:METAR>"#;

/// Forecast valid 06Z-12Z: CAVOK base, TEMPO +TSRA 07Z-09Z, BECMG 09Z
/// to 3000 m and BKN020
const TAF: &str = r#"<iwxxm:TAF xmlns:iwxxm="http://icao.int/iwxxm/3.0" xmlns:gml="http://www.opengis.net/gml/3.2" xmlns:xlink="http://www.w3.org/1999/xlink">
  <iwxxm:issueTime><gml:TimeInstant><gml:timePosition>2024-03-05T05:00:00Z</gml:timePosition></gml:TimeInstant></iwxxm:issueTime>
  <iwxxm:aerodrome><aixm:AirportHeliport><aixm:timeSlice><aixm:AirportHeliportTimeSlice>
    <aixm:locationIndicatorICAO>RKSS</aixm:locationIndicatorICAO>
    <aixm:name>GIMPO INTERNATIONAL</aixm:name>
  </aixm:AirportHeliportTimeSlice></aixm:timeSlice></aixm:AirportHeliport></iwxxm:aerodrome>
  <iwxxm:validPeriod><gml:TimePeriod>
    <gml:beginPosition>2024-03-05T06:00:00Z</gml:beginPosition>
    <gml:endPosition>2024-03-05T12:00:00Z</gml:endPosition>
  </gml:TimePeriod></iwxxm:validPeriod>
  <iwxxm:baseForecast><iwxxm:MeteorologicalAerodromeForecast cloudAndVisibilityOK="true">
    <iwxxm:surfaceWind><iwxxm:AerodromeSurfaceWindForecast>
      <iwxxm:meanWindDirection uom="deg">180</iwxxm:meanWindDirection>
      <iwxxm:meanWindSpeed uom="[kn_i]">8</iwxxm:meanWindSpeed>
    </iwxxm:AerodromeSurfaceWindForecast></iwxxm:surfaceWind>
    <iwxxm:temperature><iwxxm:AerodromeAirTemperatureForecast>
      <iwxxm:maximumAirTemperature uom="Cel">9</iwxxm:maximumAirTemperature>
      <iwxxm:maximumAirTemperatureTime><gml:TimeInstant><gml:timePosition>0515</gml:timePosition></gml:TimeInstant></iwxxm:maximumAirTemperatureTime>
      <iwxxm:minimumAirTemperature uom="Cel">M03</iwxxm:minimumAirTemperature>
      <iwxxm:minimumAirTemperatureTime><gml:TimeInstant><gml:timePosition>0521</gml:timePosition></gml:TimeInstant></iwxxm:minimumAirTemperatureTime>
    </iwxxm:AerodromeAirTemperatureForecast></iwxxm:temperature>
  </iwxxm:MeteorologicalAerodromeForecast></iwxxm:baseForecast>
  <iwxxm:changeForecast><iwxxm:MeteorologicalAerodromeForecast changeIndicator="BECOMING">
    <iwxxm:phenomenonTime><gml:TimePeriod>
      <gml:beginPosition>2024-03-05T09:00:00Z</gml:beginPosition>
      <gml:endPosition>2024-03-05T10:00:00Z</gml:endPosition>
    </gml:TimePeriod></iwxxm:phenomenonTime>
    <iwxxm:prevailingVisibility uom="m">3000</iwxxm:prevailingVisibility>
    <iwxxm:cloud><iwxxm:AerodromeCloudForecast>
      <iwxxm:layer><iwxxm:CloudLayer>
        <iwxxm:amount xlink:href="http://codes.wmo.int/49-2/CloudAmountReportedAtAerodrome/BKN"/>
        <iwxxm:base uom="[ft_i]">2000</iwxxm:base>
      </iwxxm:CloudLayer></iwxxm:layer>
    </iwxxm:AerodromeCloudForecast></iwxxm:cloud>
  </iwxxm:MeteorologicalAerodromeForecast></iwxxm:changeForecast>
  <iwxxm:changeForecast><iwxxm:MeteorologicalAerodromeForecast changeIndicator="TEMPORARY_FLUCTUATIONS">
    <iwxxm:phenomenonTime><gml:TimePeriod>
      <gml:beginPosition>2024-03-05T07:00:00Z</gml:beginPosition>
      <gml:endPosition>2024-03-05T09:00:00Z</gml:endPosition>
    </gml:TimePeriod></iwxxm:phenomenonTime>
    <iwxxm:weather xlink:href="http://codes.wmo.int/306/4678/+TSRA"/>
  </iwxxm:MeteorologicalAerodromeForecast></iwxxm:changeForecast>
</iwxxm:TAF>"#;

fn escape(xml: &str) -> String {
    xml.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn envelope(item_fields: &str) -> String {
    format!(
        "<response><header><resultCode>00</resultCode></header><body><items><item>{item_fields}</item></items></body></response>"
    )
}

fn nested_metar() -> String {
    envelope(&format!(
        "<airportName>Incheon</airportName><metarMsg>{}</metarMsg>",
        escape(METAR)
    ))
}

fn nested_taf() -> String {
    envelope(&format!("<tafMsg>{}</tafMsg>", escape(TAF)))
}

#[test]
fn test_nested_metar_document() {
    let record = parse_metar_xml(&nested_metar()).unwrap().unwrap();

    assert_eq!(record.header.icao, "RKSI");
    assert_eq!(record.header.airport_name.as_deref(), Some("Incheon"));
    assert!(!record.header.automated);
    assert_eq!(
        record.header.observation_time,
        Some(Utc.with_ymd_and_hms(2024, 3, 5, 6, 0, 0).unwrap())
    );

    let obs = &record.observation;
    assert_eq!(obs.wind.raw, "33022G34KT");
    assert_eq!(obs.wind.barb.long_barbs, 2);
    assert_eq!(obs.visibility.value, Some(2500));

    let weather = &obs.weather[0];
    assert_eq!(weather.intensity, Intensity::Light);
    assert_eq!(weather.descriptor, Some(Descriptor::Showers));
    assert_eq!(weather.phenomena, vec![Phenomenon::Snow]);

    assert_eq!(obs.display.clouds, "FEW015 BKN035");
    assert_eq!(obs.display.temperature.as_deref(), Some("M02/M05"));
    assert_eq!(obs.display.qnh.as_deref(), Some("Q1021"));
    assert_eq!(obs.display.weather_icon, "SHSN");
    assert_eq!(aerowx::ceiling_ft(&obs.clouds), Some(3500));
}

#[test]
fn test_doubly_escaped_and_inline_metar_agree() {
    let doubly = envelope(&format!("<metarMsg>{}</metarMsg>", escape(&escape(METAR))));
    let inline = envelope(&format!("<metar>{METAR}</metar>"));

    let doubly = parse_metar_xml(&doubly).unwrap().unwrap();
    let inline = parse_metar_xml(&inline).unwrap().unwrap();
    assert_eq!(doubly.observation, inline.observation);
    assert_eq!(doubly.header.icao, "RKSI");
}

#[test]
fn test_parsing_is_idempotent() {
    let first = parse_metar_xml(&nested_metar()).unwrap();
    let second = parse_metar_xml(&nested_metar()).unwrap();
    assert_eq!(first, second);

    let options = TimelineOptions::default();
    let first = parse_taf_xml(&nested_taf(), &options).unwrap().unwrap();
    let second = parse_taf_xml(&nested_taf(), &options).unwrap().unwrap();
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_missing_identifier_yields_none() {
    let metar = METAR
        .replace("<aixm:designator>RKSI</aixm:designator>", "")
        .replace(
            "<aixm:locationIndicatorICAO>RKSI</aixm:locationIndicatorICAO>",
            "",
        );
    let document = envelope(&format!("<metar>{metar}</metar>"));
    assert!(parse_metar_xml(&document).unwrap().is_none());
}

#[test]
fn test_forecast_timeline_precedence() {
    let record = parse_taf_xml(&nested_taf(), &TimelineOptions::default())
        .unwrap()
        .unwrap();

    assert_eq!(record.header.icao, "RKSS");
    assert_eq!(record.header.airport_name.as_deref(), Some("GIMPO INTERNATIONAL"));
    assert_eq!(record.timeline.len(), 6);

    let slot = |index: usize| &record.timeline[index];

    // 06Z: base CAVOK
    assert!(slot(0).visibility.cavok);
    assert_eq!(slot(0).visibility.value, Some(9999));
    assert!(slot(0).weather.is_empty());
    assert!(slot(0).clouds.is_empty());
    assert_eq!(slot(0).display.weather_icon, "CAVOK");
    assert_eq!(slot(0).display.wind.as_deref(), Some("18008KT"));

    // 07Z-08Z: temporary thunderstorm
    for index in [1, 2] {
        assert!(!slot(index).visibility.cavok);
        assert_eq!(slot(index).weather.len(), 1);
        assert_eq!(slot(index).weather[0].intensity, Intensity::Heavy);
        assert_eq!(slot(index).display.weather, "+TSRA");
        assert_eq!(slot(index).display.weather_icon, "TSRA");
    }

    // 09Z onward: becoming persists, tempo has ended
    for index in 3..6 {
        assert_eq!(slot(index).visibility.value, Some(3000));
        assert_eq!(slot(index).display.clouds, "BKN020");
        assert!(
            slot(index)
                .weather
                .iter()
                .all(|w| w.descriptor != Some(Descriptor::Thunderstorm))
        );
        assert_eq!(slot(index).weather[0].phenomena, vec![Phenomenon::Mist]);
    }

    let temperatures = record.header.temperatures;
    assert_eq!(temperatures.max.value, Some(9.0));
    assert_eq!(
        temperatures.max.time,
        Some(Utc.with_ymd_and_hms(2024, 3, 5, 15, 0, 0).unwrap())
    );
    assert_eq!(temperatures.min.value, Some(-3.0));
}

#[test]
fn test_cavok_slots_are_fully_reset() {
    let record = parse_taf_xml(&nested_taf(), &TimelineOptions::default())
        .unwrap()
        .unwrap();

    for slot in record.timeline.iter().filter(|slot| slot.visibility.cavok) {
        assert_eq!(slot.visibility.value, Some(9999));
        assert!(slot.weather.is_empty());
        assert!(slot.clouds.is_empty());
    }
}

#[test]
fn test_timeline_segments() {
    let record = parse_taf_xml(&nested_taf(), &TimelineOptions { infer_mist: false })
        .unwrap()
        .unwrap();

    let segments = segment_timeline(&record.timeline, |slot| slot.display.weather_icon.clone());
    let runs: Vec<_> = segments
        .iter()
        .map(|s| (s.value.as_str(), s.hour_count))
        .collect();
    assert_eq!(runs, vec![("CAVOK", 1), ("TSRA", 2), ("NSW", 3)]);
}

#[test]
fn test_malformed_envelope_is_an_error() {
    assert!(parse_metar_xml("<response><body>").is_err());
    assert!(parse_taf_xml("<a></b>", &TimelineOptions::default()).is_err());
}

#[test]
fn test_cli_decodes_metar_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(nested_metar().as_bytes()).unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_aerowx"))
        .args(["metar", &file.path().to_string_lossy()])
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let record: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(record["header"]["icao"], "RKSI");
    assert_eq!(record["observation"]["display"]["wind"], "33022G34KT");
}

#[test]
fn test_cli_decodes_token() {
    let output = Command::new(env!("CARGO_BIN_EXE_aerowx"))
        .args(["decode", "+TSRA"])
        .output()
        .expect("Failed to execute command");

    assert!(output.status.success());
    let token: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(token["intensity"], "HEAVY");
    assert_eq!(token["descriptor"], "TS");
    assert_eq!(token["phenomena"], serde_json::json!(["RA"]));
}

#[test]
fn test_cli_reports_missing_file() {
    let output = Command::new(env!("CARGO_BIN_EXE_aerowx"))
        .args(["taf", "/nonexistent/aerowx/taf.xml"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error"));
}
