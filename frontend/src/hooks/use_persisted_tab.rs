use yew::prelude::*;

use crate::services::storage;

/// Tab selection that survives reloads. Stored values not in `allowed` fall
/// back to the first allowed tab.
#[hook]
pub fn use_persisted_tab(
    key: &'static str,
    allowed: &'static [&'static str],
) -> (String, Callback<String>) {
    let active = use_state(|| {
        storage::load_raw(key)
            .filter(|stored| allowed.contains(&stored.as_str()))
            .or_else(|| allowed.first().map(|tab| tab.to_string()))
            .unwrap_or_default()
    });

    let select = {
        let active = active.clone();
        use_callback(key, move |tab: String, key| {
            storage::save_raw(key, &tab);
            active.set(tab);
        })
    };

    ((*active).clone(), select)
}
