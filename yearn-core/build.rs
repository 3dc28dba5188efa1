fn main() {
    // Variadic log callback handed to cores, formats then calls back into Rust
    println!("cargo:rerun-if-changed=cshim");

    cc::Build::new().file("cshim/cshim.c").compile("libcshim.a");
}
