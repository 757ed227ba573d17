use atm_aux::{
    geometry::SearchPolygon,
    search::{search_polygon, temporal_search, Span},
    time::epoch2iso,
    AuxError, AuxFile, ReadOptions,
};

const T0: f64 = 1557000000.;

/// 41 comment lines, then the column-header row on line 42.
fn header_lines(with_lever_arm: bool) -> Vec<String> {
    let mut lines = vec![
        "# CAMBOTv2 auxiliary navigation file".to_owned(),
        "# Input ancillary file: IOCAM0_2019_GR_NASA_20190504.nav, created 2019-05-05".to_owned(),
    ];
    if with_lever_arm {
        lines.push(
            "# Lever arm, GPS antenna to camera [x-forward, y-starboard, z-down]: 0.10, 0.02, -0.15"
                .to_owned(),
        );
    }
    lines.push("# Camera mounting angles [pitch, roll, heading]: 0.25, -0.13, 180.50".to_owned());
    lines.push("# Time offset (camera - GPS) in seconds: 0.0".to_owned());
    lines.push("# Range bias (m): 0.0".to_owned());
    while lines.len() < 41 {
        lines.push(format!("# processing note {}", lines.len()));
    }
    lines.push(
        "# ImageFilename,Timestamp(UTC),PosixTime(UTC),Latitude(deg),Longitude(deg),\
         Ellipsoid_Height(m),AGL(m),Roll(deg),Pitch(deg),Heading(deg)"
            .to_owned(),
    );
    lines
}

fn aux_text(with_lever_arm: bool, rows: usize) -> String {
    let mut text = header_lines(with_lever_arm).join("\n");
    text.push('\n');
    for i in 0..rows {
        let t = T0 + i as f64;
        let lat = if i < 5 { 0.0 } else { 69. + 1e-3 * i as f64 };
        let lon = 310. + 1e-3 * i as f64;
        text.push_str(&format!(
            "{:05}.jpg,{},{},{},{},120.4,505.1,1.1,-0.4,92.7\n",
            i,
            epoch2iso(t).unwrap(),
            t,
            lat,
            lon
        ));
    }
    text
}

#[test]
fn thousand_row_temporal_search() {
    let text = aux_text(true, 1000);
    let aux = AuxFile::from_reader(text.as_bytes(), &ReadOptions::default()).unwrap();

    assert_eq!(aux.lever_arm_sensor(), [0.10, 0.02, -0.15]);
    let row = aux.header.header_row.as_ref().unwrap();
    assert_eq!(row.index, 41);
    assert_eq!(row.headers.len(), 10);
    assert_eq!(aux.table.len(), 995);

    let result =
        temporal_search(&aux.table, "2019-05-04T20:00:05.0", "2019-05-04T20:00:10.0").unwrap();
    assert_eq!(result.len(), 6);
    let Span { first, last } = result.span.unwrap();
    assert_eq!(aux.table.posix_times()[first], T0 + 5.);
    assert_eq!(aux.table.posix_times()[last], T0 + 10.);
}

#[test]
fn missing_lever_arm_fails_before_body() {
    let mut text = aux_text(false, 0);
    text.push_str("not,a,valid\nbody\n");
    assert!(matches!(
        AuxFile::from_reader(text.as_bytes(), &ReadOptions::default()),
        Err(AuxError::MalformedHeader(_))
    ));
}

#[test]
fn header_row_past_scan_limit() {
    let text = aux_text(true, 10);
    let options = ReadOptions {
        max_header_lines: 41,
        ..Default::default()
    };
    assert!(matches!(
        AuxFile::from_reader(text.as_bytes(), &options),
        Err(AuxError::MalformedHeader(_))
    ));

    let options = ReadOptions {
        max_header_lines: 42,
        ..Default::default()
    };
    assert_eq!(AuxFile::from_reader(text.as_bytes(), &options).unwrap().table.len(), 5);
}

#[test]
fn spatial_subset_to_csv() {
    let text = aux_text(true, 1000);
    let aux = AuxFile::from_reader(text.as_bytes(), &ReadOptions::default()).unwrap();

    // rows 100..=200 fall in lat [69.1, 69.2], lon [-49.9, -49.8] after wrap
    let area = SearchPolygon::from_wkt(
        "POLYGON ((-49.95 69.0995, -49.75 69.0995, -49.75 69.2005, -49.95 69.2005, -49.95 69.0995))",
    )
    .unwrap();
    let result = search_polygon(&aux.table, &area, true).unwrap();
    assert_eq!(result.len(), 101);
    let window = result.window.clone().unwrap();
    assert_eq!(window.start, epoch2iso(T0 + 100.).unwrap());
    assert_eq!(window.end, epoch2iso(T0 + 200.).unwrap());

    let mut out = vec![];
    aux.table
        .write_csv(&mut out, result.indices.iter().copied())
        .unwrap();
    let out = String::from_utf8(out).unwrap();
    let mut lines = out.lines();
    assert_eq!(
        lines.next(),
        Some("ID,Timestamp_UTC,PosixTime_UTC,gps_lat_deg,gps_lon_deg,gps_ele_m,gps_agl_m,roll_deg,pitch_deg,yaw_deg")
    );
    assert!(lines.next().unwrap().starts_with("00100.jpg,"));
    assert_eq!(lines.count(), 100);
}
