use std::env;

static NATIVE_LIB_NAME: &str = "Newton";
static SOURCE_DIR: &str = "newton-dynamics";

fn main() {
    println!("cargo:rerun-if-env-changed=NEWTON_LIB_DIR");

    // Without `link` only the type declarations are compiled, so there is nothing to link.
    if env::var_os("CARGO_FEATURE_LINK").is_none() {
        return;
    }

    #[cfg(feature = "bundled")]
    {
        let dst = cmake::Config::new(SOURCE_DIR)
            .define("NEWTON_DEMOS_SANDBOX", "OFF")
            .build();

        eprintln!("Newton built from {src} into {dst}", src = SOURCE_DIR, dst = dst.display());
        println!("cargo:rustc-link-search=native={path}/lib64/", path = dst.display());
        println!("cargo:rustc-link-search=native={path}/lib/", path = dst.display());
    }
    #[cfg(not(feature = "bundled"))]
    let _ = SOURCE_DIR;

    if let Some(dir) = env::var_os("NEWTON_LIB_DIR") {
        println!("cargo:rustc-link-search=native={}", dir.to_string_lossy());
    }

    println!("cargo:rustc-link-lib={name}", name = NATIVE_LIB_NAME);
    match env::var("CARGO_CFG_TARGET_OS").as_ref().map(String::as_str) {
        Ok("macos") | Ok("ios") => println!("cargo:rustc-link-lib=c++"),
        Ok("windows") => {}
        _ => println!("cargo:rustc-link-lib=stdc++"),
    }
}
