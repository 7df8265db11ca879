//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

use super::inverse_report;

#[test]
fn test_inverse_report() {
    let report = inverse_report((-31.95, 115.86), (-31.95, 115.86)).unwrap();
    assert_eq!(
        report,
        "distance: 0.000 km\ninitial bearing: 0.000000\nfinal bearing: 0.000000"
    );

    // due north along a meridian
    let report = inverse_report((-32.0, 115.0), (-31.0, 115.0)).unwrap();
    let lines = report.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("distance: 110."));
    assert_eq!(lines[1], "initial bearing: 0.000000");
}
