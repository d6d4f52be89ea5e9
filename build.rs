use std::env;

fn main() {
    println!("cargo:rerun-if-env-changed=DEP_GDAL_VERSION_NUMBER");

    // gdal-sys publishes the linked GDAL version as MMmmpp00, e.g. 3080400 for 3.8.4
    let gdal_version = match env::var("DEP_GDAL_VERSION_NUMBER")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
    {
        Some(version) => version,
        None => {
            println!("cargo:warning=could not detect the GDAL version; assuming GDAL 3.0");
            3_000_000
        }
    };

    let major = gdal_version / 1_000_000;
    let minor = (gdal_version - major * 1_000_000) / 10_000;
    println!("GDAL version: {major}.{minor}");

    if major == 3 {
        println!("cargo:rustc-cfg=major_is_3");
    }

    for major in 3..=major {
        println!("cargo:rustc-cfg=major_ge_{major}");
    }

    for minor in 1..=minor.min(10) {
        println!("cargo:rustc-cfg=minor_ge_{minor}");
    }
}
