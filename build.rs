use cfg_aliases::cfg_aliases;

fn main() {
    // The script doesn't depend on our code.
    println!("cargo:rerun-if-changed=build.rs");

    // Setup cfg aliases.
    cfg_aliases! {
        // Systems.
        android_platform: { target_os = "android" },
        windows_platform: { target_os = "windows" },
        ios_platform: { target_os = "ios" },

        // Android binding.
        android_game_activity: { all(android_platform, feature = "android-game-activity") },

        // iOS adapter selection.
        ios_backward_field: { all(ios_platform, feature = "ios-backward-field") },
        ios_confirm_bar: { all(ios_platform, not(feature = "ios-backward-field")) },
    }
}
