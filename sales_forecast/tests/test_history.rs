mod common;

use approx::assert_relative_eq;
use common::{date, write_history, HISTORY_CSV};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::thread;
use sales_forecast::{
    load_history, mean_absolute_error, mean_absolute_percentage_error, query_by_store,
    ForecastError, HistoryStore, PercentageError, StoreAccuracy,
};
use tempfile::tempdir;

#[test]
fn test_load_history() {
    let dir = tempdir().unwrap();
    let path = write_history(dir.path(), HISTORY_CSV);

    let records = load_history(&path).unwrap();
    assert_eq!(records.len(), 6);
    assert_eq!(records[0].store_id, 1);
    assert_eq!(records[0].date, date(2015, 7, 3));
    assert_eq!(records[0].actual_sales, 5000.0);
    assert_eq!(records[0].predicted_sales, 4800.0);
}

#[test]
fn test_extra_columns_and_whitespace_are_tolerated() {
    let dir = tempdir().unwrap();
    let path = write_history(
        dir.path(),
        "Store, Date ,Customers,Actual_Sales,Predicted_Sales,Open\n\
         7, 2015-07-31 00:00:00 ,555,5263,5020.5,1\n\
         7,2015-07-30,546,5020,4999.9,1\n",
    );

    let records = load_history(&path).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].date, date(2015, 7, 31));
    assert_relative_eq!(records[0].predicted_sales, 5020.5);
}

#[test]
fn test_bad_row_reports_line() {
    let dir = tempdir().unwrap();
    let path = write_history(
        dir.path(),
        "Store,Date,Actual_Sales,Predicted_Sales\n\
         1,2015-07-01,100,90\n\
         1,yesterday,100,90\n",
    );

    let err = load_history(&path).unwrap_err();
    assert!(matches!(err, ForecastError::LoadError { .. }));
    assert!(err.to_string().contains("line 3"), "{}", err);
}

#[test]
fn test_missing_column_is_an_error() {
    let dir = tempdir().unwrap();
    let path = write_history(dir.path(), "Store,Date,Actual_Sales\n1,2015-07-01,100\n");
    assert!(load_history(&path).is_err());
}

#[test]
fn test_corrupt_file_degrades_store_to_empty() {
    let dir = tempdir().unwrap();
    let path = write_history(dir.path(), "Store,Date,Actual_Sales,Predicted_Sales\nx,y,z,w\n");

    let store = HistoryStore::new(&path);
    assert!(!store.has_history());
    assert!(store.query_by_store(1).is_empty());
    assert_eq!(store.path(), path.as_path());
}

#[test]
fn test_concurrent_first_use_loads_once() {
    let dir = tempdir().unwrap();
    let store = HistoryStore::new(write_history(dir.path(), HISTORY_CSV));

    let loaded: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8).map(|_| scope.spawn(|| store.records())).collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(loaded[0].len(), 6);
    for records in &loaded[1..] {
        assert!(Arc::ptr_eq(&loaded[0], records));
    }
}

#[test]
fn test_query_by_store_orders_by_date() {
    let dir = tempdir().unwrap();
    let store = HistoryStore::new(write_history(dir.path(), HISTORY_CSV));

    let store_one = store.query_by_store(1);
    let dates: Vec<_> = store_one.iter().map(|r| r.date).collect();
    assert_eq!(dates, vec![date(2015, 7, 1), date(2015, 7, 2), date(2015, 7, 3)]);
    assert_eq!(store.store_ids(), vec![1, 2, 3]);
    assert!(store.query_by_store(4).is_empty());
}

#[test]
fn test_accuracy_metrics() {
    let dir = tempdir().unwrap();
    let records = load_history(write_history(dir.path(), HISTORY_CSV)).unwrap();

    let store_one = query_by_store(&records, 1);
    // errors 400, 0, 200
    assert_relative_eq!(mean_absolute_error(&store_one).unwrap(), 200.0);
    // (0.10 + 0.0 + 0.04) / 3
    let mape = mean_absolute_percentage_error(&store_one).value().unwrap();
    assert_relative_eq!(mape, 14.0 / 3.0, epsilon = 1e-9);

    let store_three = StoreAccuracy::for_store(&records, 3);
    assert_relative_eq!(store_three.mae.unwrap(), 125.0);
    assert_eq!(store_three.mape, PercentageError::Undefined { zero_actuals: 1 });
    assert!(store_three.to_string().contains("zero actual sales"));
}
