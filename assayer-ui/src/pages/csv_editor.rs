//! CSV Editor Page
//!
//! Loads a CSV sheet into an editable grid. Saving sends the grid to
//! `/edit-csv` and downloads the returned file.

use leptos::*;

use crate::api;
use crate::components::{read_text, FilePicker, InlineLoading};
use crate::sheet::Sheet;
use crate::state::GlobalState;

const EDITED_FILENAME: &str = "edited.csv";

/// CSV editor page component
#[component]
pub fn CsvEditor() -> impl IntoView {
    let state = expect_context::<GlobalState>();

    let file = create_rw_signal(None::<web_sys::File>);
    let sheet = create_rw_signal(None::<Sheet>);
    let (new_column, set_new_column) = create_signal(String::new());
    let (saving, set_saving) = create_signal(false);

    // Load the chosen file into the grid
    let state_for_load = state.clone();
    create_effect(move |_| {
        let Some(selected) = file.get() else {
            return;
        };
        let state_clone = state_for_load.clone();
        spawn_local(async move {
            match read_text(&selected).await.and_then(|text| Sheet::parse(&text)) {
                Ok(parsed) => sheet.set(Some(parsed)),
                Err(e) => state_clone.show_error(&e),
            }
        });
    });

    let state_for_column = state.clone();
    let add_column = move |_| {
        let mut result = Ok(());
        sheet.update(|s| {
            if let Some(s) = s {
                result = s.add_column(&new_column.get_untracked());
            }
        });
        match result {
            Ok(()) => set_new_column.set(String::new()),
            Err(e) => state_for_column.show_error(&e),
        }
    };

    let state_for_save = state.clone();
    let save = move |_| {
        let Some(current) = sheet.get() else {
            state_for_save.show_error("Load a CSV file first");
            return;
        };

        set_saving.set(true);
        let state_clone = state_for_save.clone();
        spawn_local(async move {
            let result = api::edit_csv(current.columns, current.rows)
                .await
                .and_then(|csv| api::download_bytes(&csv, EDITED_FILENAME));
            match result {
                Ok(()) => state_clone.show_success("CSV saved"),
                Err(e) => state_clone.show_error(&e),
            }
            set_saving.set(false);
        });
    };

    let row_count = move || sheet.with(|s| s.as_ref().map_or(0, |s| s.rows.len()));
    let columns = move || sheet.with(|s| s.as_ref().map(|s| s.columns.clone()).unwrap_or_default());

    view! {
        <div class="space-y-6">
            <div>
                <h1 class="text-3xl font-bold">"CSV Editor"</h1>
                <p class="text-gray-500 mt-1">"Edit cells in place, then save to download the sheet."</p>
            </div>

            <section class="bg-white rounded-xl shadow p-6">
                <FilePicker label="CSV file" file=file />
            </section>

            <Show when=move || sheet.with(Option::is_some)>
                <section class="bg-white rounded-xl shadow p-6 space-y-4 overflow-x-auto">
                    <table class="text-sm">
                        <thead>
                            <tr>
                                {move || columns().into_iter().map(|column| view! {
                                    <th class="px-2 py-1 text-left text-gray-500">{column}</th>
                                }).collect_view()}
                                <th />
                            </tr>
                        </thead>
                        <tbody>
                            {move || (0..row_count()).map(|row| view! {
                                <tr class="border-t">
                                    {(0..columns().len()).map(|col| {
                                        let value = sheet.with_untracked(|s| {
                                            s.as_ref()
                                                .and_then(|s| s.rows.get(row))
                                                .and_then(|r| r.get(col))
                                                .cloned()
                                                .unwrap_or_default()
                                        });
                                        view! {
                                            <td class="px-1 py-1">
                                                <input
                                                    type="text"
                                                    value=value
                                                    on:change=move |ev| {
                                                        let text = event_target_value(&ev);
                                                        sheet.update(|s| {
                                                            if let Some(s) = s {
                                                                s.set_cell(row, col, text);
                                                            }
                                                        });
                                                    }
                                                    class="w-28 rounded px-2 py-1 border border-gray-200"
                                                />
                                            </td>
                                        }
                                    }).collect_view()}
                                    <td>
                                        <button
                                            on:click=move |_| sheet.update(|s| {
                                                if let Some(s) = s {
                                                    s.remove_row(row);
                                                }
                                            })
                                            class="text-red-600 text-xs px-2"
                                        >
                                            "Delete"
                                        </button>
                                    </td>
                                </tr>
                            }).collect_view()}
                        </tbody>
                    </table>

                    <div class="flex flex-wrap items-center gap-2">
                        <button
                            on:click=move |_| sheet.update(|s| {
                                if let Some(s) = s {
                                    s.add_row();
                                }
                            })
                            class="px-3 py-2 bg-gray-200 hover:bg-gray-300 rounded-lg text-sm"
                        >
                            "Add row"
                        </button>
                        <input
                            type="text"
                            placeholder="New column"
                            prop:value=move || new_column.get()
                            on:input=move |ev| set_new_column.set(event_target_value(&ev))
                            class="rounded-lg px-3 py-2 border border-gray-300 text-sm"
                        />
                        <button
                            on:click=add_column.clone()
                            class="px-3 py-2 bg-gray-200 hover:bg-gray-300 rounded-lg text-sm"
                        >
                            "Add column"
                        </button>
                        <button
                            on:click=save.clone()
                            disabled=move || saving.get()
                            class="ml-auto px-4 py-2 bg-blue-600 hover:bg-blue-700 disabled:bg-gray-400 text-white rounded-lg font-medium"
                        >
                            {move || if saving.get() {
                                view! { <InlineLoading /> " Saving..." }.into_view()
                            } else {
                                "Save".into_view()
                            }}
                        </button>
                    </div>
                </section>
            </Show>
        </div>
    }
}
