//! Metal Calculation Page
//!
//! Values an item sheet against a price sheet. Weights the backend cannot
//! read are listed for correction first. Both sheets are then parsed in
//! the browser and sent to `/calculate-fixed` with any corrections applied.

use leptos::*;

use crate::api::{self, InvalidWeight};
use crate::components::{read_text, FilePicker, InlineLoading};
use crate::sheet::Sheet;
use crate::state::GlobalState;

/// Download name of the valued sheet
const RESULT_FILENAME: &str = "calculated_result.csv";

/// Value both sheets with `fixes` applied and download the result
async fn value_sheets(
    items: &web_sys::File,
    prices: &web_sys::File,
    fixes: &[(usize, String)],
) -> Result<(), String> {
    let item_sheet = Sheet::parse(&read_text(items).await?)?;
    let price_sheet = Sheet::parse(&read_text(prices).await?)?;
    let csv = api::calculate_fixed(item_sheet.corrected_records(fixes), price_sheet.records()).await?;
    api::download_bytes(&csv, RESULT_FILENAME)
}

/// Metal calculation page component
#[component]
pub fn MetalCalculate() -> impl IntoView {
    let state = expect_context::<GlobalState>();

    let item_file = create_rw_signal(None::<web_sys::File>);
    let price_file = create_rw_signal(None::<web_sys::File>);
    let invalid = create_rw_signal(Vec::<InvalidWeight>::new());
    let corrections = create_rw_signal(Vec::<(usize, String)>::new());
    let (busy, set_busy) = create_signal(false);

    let state_for_calculate = state.clone();
    let calculate = move |_| {
        let (Some(items), Some(prices)) = (item_file.get(), price_file.get()) else {
            state_for_calculate.show_error("Both files are required");
            return;
        };

        set_busy.set(true);
        let state_clone = state_for_calculate.clone();
        spawn_local(async move {
            let result = match api::check_weights(&items).await {
                Ok(rows) if rows.is_empty() => value_sheets(&items, &prices, &[]).await.map(|_| true),
                Ok(rows) => {
                    corrections.set(rows.iter().map(|r| (r.index, r.weight.clone())).collect());
                    invalid.set(rows);
                    Ok(false)
                }
                Err(e) => Err(e),
            };

            match result {
                Ok(true) => state_clone.show_success("Calculation complete"),
                Ok(false) => state_clone.show_error("Some weights need fixing before calculating"),
                Err(e) => state_clone.show_error(&e),
            }
            set_busy.set(false);
        });
    };

    let state_for_fixed = state.clone();
    let calculate_fixed = move |_| {
        let (Some(items), Some(prices)) = (item_file.get(), price_file.get()) else {
            state_for_fixed.show_error("Both files are required");
            return;
        };
        let fixes = corrections.get();

        set_busy.set(true);
        let state_clone = state_for_fixed.clone();
        spawn_local(async move {
            match value_sheets(&items, &prices, &fixes).await {
                Ok(()) => {
                    invalid.set(Vec::new());
                    corrections.set(Vec::new());
                    state_clone.show_success("Calculation complete");
                }
                Err(e) => state_clone.show_error(&e),
            }
            set_busy.set(false);
        });
    };

    let set_correction = move |index: usize, value: String| {
        corrections.update(|fixes| {
            if let Some(fix) = fixes.iter_mut().find(|(i, _)| *i == index) {
                fix.1 = value;
            }
        });
    };

    view! {
        <div class="space-y-8">
            <div>
                <h1 class="text-3xl font-bold">"Metal Calculation"</h1>
                <p class="text-gray-500 mt-1">
                    "Item sheet columns: box_no, box_id, weight, misc, material. Price sheet columns: material, price."
                </p>
            </div>

            <section class="bg-white rounded-xl shadow p-6 space-y-4">
                <div class="grid md:grid-cols-2 gap-4">
                    <FilePicker label="Item sheet (CSV)" file=item_file />
                    <FilePicker label="Price sheet (CSV)" file=price_file />
                </div>
                <button
                    on:click=calculate
                    disabled=move || busy.get()
                    class="px-4 py-3 bg-blue-600 hover:bg-blue-700 disabled:bg-gray-400 text-white rounded-lg font-medium"
                >
                    {move || if busy.get() {
                        view! { <InlineLoading /> " Working..." }.into_view()
                    } else {
                        "Calculate".into_view()
                    }}
                </button>
            </section>

            <Show when=move || invalid.with(|rows| !rows.is_empty())>
                <section class="bg-white rounded-xl shadow p-6 space-y-4">
                    <h2 class="text-xl font-semibold">"Fix unreadable weights"</h2>
                    <table class="w-full text-sm">
                        <thead>
                            <tr class="text-left text-gray-500">
                                <th class="py-2">"Row"</th>
                                <th>"Box No"</th>
                                <th>"Box ID"</th>
                                <th>"Weight"</th>
                            </tr>
                        </thead>
                        <tbody>
                            <For
                                each=move || invalid.get()
                                key=|row| row.index
                                children=move |row| {
                                    let index = row.index;
                                    view! {
                                        <tr class="border-t">
                                            <td class="py-2">{index + 1}</td>
                                            <td>{row.box_no}</td>
                                            <td>{row.box_id}</td>
                                            <td>
                                                <input
                                                    type="text"
                                                    value=row.weight
                                                    on:input=move |ev| set_correction(index, event_target_value(&ev))
                                                    class="w-32 rounded px-2 py-1 border border-gray-300"
                                                />
                                            </td>
                                        </tr>
                                    }
                                }
                            />
                        </tbody>
                    </table>
                    <button
                        on:click=calculate_fixed.clone()
                        disabled=move || busy.get()
                        class="px-4 py-3 bg-green-600 hover:bg-green-700 disabled:bg-gray-400 text-white rounded-lg font-medium"
                    >
                        "Calculate with corrections"
                    </button>
                </section>
            </Show>
        </div>
    }
}
