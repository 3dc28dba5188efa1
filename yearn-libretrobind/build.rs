use std::env;

// Prefixes of the cores that can be linked in, one cargo feature each
const STATIC_CORES: [&str; 8] = [
    "fceumm",
    "gambatte",
    "mgba",
    "clownmdemu",
    "melonds",
    "mupen64plus_next",
    "pcsx_rearmed",
    "bsnes",
];

fn main() {
    println!("cargo:rerun-if-env-changed=YEARN_STATIC_CORES_DIR");
    println!("cargo:rerun-if-env-changed=YEARN_STATIC_CXX");

    let enabled: Vec<&str> = STATIC_CORES
        .iter()
        .copied()
        .filter(|core| {
            let feature = format!("CARGO_FEATURE_STATIC_{}", core.to_uppercase());
            env::var_os(feature).is_some() || env::var_os("CARGO_FEATURE_STATIC_ALL").is_some()
        })
        .collect();

    if enabled.is_empty() {
        return;
    }

    // Archives are built outside of cargo with their symbols already prefixed
    let dir = env::var("YEARN_STATIC_CORES_DIR")
        .expect("YEARN_STATIC_CORES_DIR must point at the prebuilt <prefix>_libretro archives");
    println!("cargo:rustc-link-search=native={}", dir);

    for core in enabled {
        println!("cargo:rustc-link-lib=static={}_libretro", core);
    }

    // Most cores are C++
    let cxx = env::var("YEARN_STATIC_CXX").unwrap_or_else(|_| String::from("stdc++"));
    if !cxx.is_empty() {
        println!("cargo:rustc-link-lib=dylib={}", cxx);
    }
}
