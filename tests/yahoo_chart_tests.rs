use dip_sniper::error::ProviderError;
use dip_sniper::yahoo::chart::bars_from_chart;
use dip_sniper::yahoo::types::ChartResponse;

fn parse(json: &str) -> Result<Vec<dip_sniper::model::bar::PriceBar>, ProviderError> {
    let resp: ChartResponse = serde_json::from_str(json).unwrap();
    bars_from_chart(resp, "005930.KS")
}

#[test]
fn parses_columnar_quotes_and_drops_missing_closes() {
    let json = r#"{
      "chart": {
        "result": [{
          "meta": {"symbol": "005930.KS", "currency": "KRW"},
          "timestamp": [1717459200, 1717372800, 1717545600],
          "indicators": {
            "quote": [{
              "open":   [75000.0, 74000.0, null],
              "high":   [76000.0, 75500.0, null],
              "low":    [74500.0, null, null],
              "close":  [75800.0, 75000.0, null],
              "volume": [12000000, null, null]
            }]
          }
        }],
        "error": null
      }
    }"#;
    let bars = parse(json).unwrap();
    assert_eq!(bars.len(), 2);
    // Sorted ascending regardless of payload order.
    assert_eq!(bars[0].timestamp_ms, 1_717_372_800_000);
    assert_eq!(bars[0].close, 75_000.0);
    assert_eq!(bars[0].low, 75_000.0);
    assert_eq!(bars[0].volume, 0.0);
    assert_eq!(bars[1].open, Some(75_000.0));
    assert_eq!(bars[1].volume, 12_000_000.0);
}

#[test]
fn chart_error_becomes_api_error() {
    let json = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
    match parse(json) {
        Err(ProviderError::Api { code, msg, .. }) => {
            assert_eq!(code, "Not Found");
            assert!(msg.contains("delisted"));
        }
        other => panic!("expected api error, got {:?}", other),
    }
}

#[test]
fn empty_result_is_no_bars() {
    let json = r#"{"chart":{"result":[],"error":null}}"#;
    assert!(parse(json).unwrap().is_empty());

    let json = r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#;
    assert!(parse(json).unwrap().is_empty());
}

#[test]
fn chart_for_another_symbol_is_rejected() {
    let json = r#"{"chart":{"result":[{
        "meta": {"symbol": "000660.KS"},
        "timestamp": [1717459200],
        "indicators": {"quote": [{"close": [190000.0], "volume": [1000]}]}
    }],"error":null}}"#;
    match parse(json) {
        Err(ProviderError::Malformed(msg)) => assert!(msg.contains("000660.KS")),
        other => panic!("expected malformed error, got {:?}", other),
    }

    // Symbol comparison ignores case.
    let json = r#"{"chart":{"result":[{
        "meta": {"symbol": "005930.ks"},
        "timestamp": [1717459200],
        "indicators": {"quote": [{"close": [75800.0], "volume": [1000]}]}
    }],"error":null}}"#;
    assert_eq!(parse(json).unwrap().len(), 1);
}
