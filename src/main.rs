//
// Copyright (c) Pirmin Kalberer. All rights reserved.
// Licensed under the MIT License. See LICENSE file in the project root for full license information.
//

#[macro_use]
extern crate clap;
#[macro_use]
extern crate log;

use clap::{App, AppSettings, ArgMatches, SubCommand};
use cop_core::core::{read_config, ApplicationCfg, Config};
use cop_service::TileService;
use dotenv::dotenv;
use env_logger::Builder;
use log::Record;
use std::env;
use std::io::{self, Write};
use std::process;
use std::str::FromStr;
use tile_grid::geodesic;
use tile_grid::Extent;
use time;

fn init_logger(args: &ArgMatches<'_>) {
    let mut builder = Builder::new();
    builder.format(|buf, record: &Record<'_>| {
        let t = time::now();
        let ts = time::strftime("%Y-%m-%d %H:%M:%S", &t)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        writeln!(
            buf,
            "{}.{:03} {} {}",
            ts,
            t.tm_nsec / 1000_000,
            record.level(),
            record.args()
        )
    });

    let rust_log_env = env::var("RUST_LOG");
    let rust_log = match (args.value_of("loglevel"), rust_log_env.as_ref()) {
        (None, Ok(rust_log)) => rust_log.as_str(),
        (loglevel, _) => match loglevel.unwrap_or("info") {
            "debug" => "debug,tokio=info",
            loglevel => loglevel,
        },
    };
    builder.parse_filters(rust_log);

    builder.init();
}

fn exit_with_error(msg: &str) -> ! {
    error!("{}", msg);
    eprintln!("{}", msg);
    process::exit(1)
}

/// Parse comma separated list of numbers
fn parse_list<T: FromStr>(arg: &str, numlist: &str) -> Vec<T> {
    numlist
        .split(',')
        .map(|v| {
            v.trim().parse().unwrap_or_else(|_| {
                exit_with_error(&format!("Error parsing '{}' value '{}'", arg, v))
            })
        })
        .collect()
}

fn parse_arg<T: FromStr>(args: &ArgMatches<'_>, arg: &str) -> Option<T> {
    args.value_of(arg).map(|s| {
        s.parse::<T>()
            .unwrap_or_else(|_| exit_with_error(&format!("Error parsing '{}' value '{}'", arg, s)))
    })
}

fn service_from_args(args: &ArgMatches<'_>) -> TileService {
    let path = args.value_of("config").unwrap_or("cop-map.toml");
    let config: ApplicationCfg = read_config(path).unwrap_or_else(|e| exit_with_error(&e));
    TileService::from_config(&config).unwrap_or_else(|e| exit_with_error(&e))
}

fn seed(args: &ArgMatches<'_>) {
    let service = service_from_args(args);
    let layer = args.value_of("layer");
    let minzoom = parse_arg::<u8>(args, "minzoom").unwrap_or(service.viewport().zoom);
    let maxzoom = parse_arg::<u8>(args, "maxzoom").unwrap_or(minzoom);
    let extent = args.value_of("extent").map(|numlist| {
        let arr: Vec<f64> = parse_list("extent", numlist);
        if arr.len() != 4 {
            exit_with_error("Extent requires minx,miny,maxx,maxy");
        }
        Extent {
            minx: arr[0],
            miny: arr[1],
            maxx: arr[2],
            maxy: arr[3],
        }
    });
    let progress = parse_arg::<bool>(args, "progress").unwrap_or(true);
    match service.seed(layer, minzoom, maxzoom, extent, progress) {
        Ok(stats) => print!("{:?}", stats),
        Err(e) => exit_with_error(&e),
    }
}

fn parse_point(args: &ArgMatches<'_>, arg: &str) -> Option<(f64, f64)> {
    args.value_of(arg).map(|numlist| {
        let arr: Vec<f64> = parse_list(arg, numlist);
        if arr.len() != 2 {
            exit_with_error(&format!("'{}' requires lat,lon", arg));
        }
        (arr[0], arr[1])
    })
}

/// Distance and bearings between two points. Coincident points report zero
/// for the undefined bearings.
fn inverse_report(from: (f64, f64), to: (f64, f64)) -> Result<String, geodesic::GeodesicError> {
    let inv = match geodesic::inverse(from.0, from.1, to.0, to.1) {
        Ok(inv) => inv,
        Err(geodesic::GeodesicError::CoincidentPoints) => geodesic::Inverse {
            distance: 0.0,
            initial_bearing: 0.0,
            final_bearing: 0.0,
        },
        Err(e) => return Err(e),
    };
    Ok(format!(
        "distance: {:.3} km\ninitial bearing: {:.6}\nfinal bearing: {:.6}",
        inv.distance / 1000.0,
        inv.initial_bearing,
        inv.final_bearing
    ))
}

fn measure(args: &ArgMatches<'_>) {
    let from = parse_point(args, "from").unwrap_or_else(|| exit_with_error("Missing 'from'"));
    if let Some(to) = parse_point(args, "to") {
        match inverse_report(from, to) {
            Ok(report) => println!("{}", report),
            Err(e) => exit_with_error(&e.to_string()),
        }
    } else {
        let bearing = parse_arg::<f64>(args, "bearing")
            .unwrap_or_else(|| exit_with_error("Missing 'to' or 'bearing'"));
        let distance = parse_arg::<f64>(args, "distance")
            .unwrap_or_else(|| exit_with_error("Missing 'distance'"));
        match geodesic::direct_projection(from.0, from.1, bearing, distance * 1000.0) {
            Ok(pt) => println!("{:.8},{:.8}", pt.lat, pt.lon),
            Err(e) => exit_with_error(&e.to_string()),
        }
    }
}

fn main() {
    dotenv().ok();
    // http://kbknapp.github.io/clap-rs/clap/
    let mut app = App::new("cop_map")
        .version(crate_version!())
        .author("Pirmin Kalberer <pka@sourcepole.ch>")
        .about("COP map tile cache and geodesic tools")
        .subcommand(SubCommand::with_name("genconfig")
                        .args_from_usage("--loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'")
                        .about("Generate configuration template"))
        .subcommand(SubCommand::with_name("seed")
                        .setting(AppSettings::AllowLeadingHyphen)
                        .args_from_usage("-c, --config=<FILE> 'Load from custom config file'
                                              --loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'
                                              --layer=[NAME] 'Layer name or workspace:name'
                                              --minzoom=[LEVEL] 'Minimum zoom level'
                                              --maxzoom=[LEVEL] 'Maximum zoom level'
                                              --extent=[minx,miny,maxx,maxy] 'Extent of tiles (lon/lat)'
                                              --progress=[true|false] 'Show progress bar'")
                        .about("Fill tile cache from the tile service"))
        .subcommand(SubCommand::with_name("measure")
                        .setting(AppSettings::AllowLeadingHyphen)
                        .args_from_usage("--loglevel=[error|warn|info|debug|trace] 'Log level (Default: info)'
                                              --from=<lat,lon> 'Start position'
                                              --to=[lat,lon] 'End position'
                                              --bearing=[DEGREES] 'Bearing clockwise from north'
                                              --distance=[KM] 'Distance in kilometers'")
                        .about("Ellipsoidal distance and bearing, or destination point"));

    match app.get_matches_from_safe_borrow(env::args()) {
        //app.get_matches() prohibits later call of app.print_help()
        Result::Err(e) => {
            println!("{}", e);
        }
        Result::Ok(matches) => match matches.subcommand() {
            ("genconfig", Some(sub_m)) => {
                init_logger(sub_m);
                println!("{}", TileService::gen_config());
            }
            ("seed", Some(sub_m)) => {
                init_logger(sub_m);
                seed(sub_m);
            }
            ("measure", Some(sub_m)) => {
                init_logger(sub_m);
                measure(sub_m);
            }
            _ => {
                let _ = app.print_help();
                println!("");
            }
        },
    }
}

#[cfg(test)]
mod main_test;
