//! CSV builders shared by the unit tests

/// A record that is compliant with every ISO threshold
const BASELINE: [(&str, &str); 29] = [
    ("Date", "2024-01-05"),
    ("Entrepôt", "Lyon"),
    ("Kilomètres_à_vide", "10"),
    ("Capacité_total_km_parcourus", "100"),
    ("Stock_moyen", "100"),
    ("Sorties_annuelles", "500"),
    ("Surface_occupée", "70"),
    ("Surface_totale", "100"),
    ("Lignes_préparées", "300"),
    ("Heures_travaillées", "10"),
    ("Stock_physique", "98"),
    ("Stock_théorique", "100"),
    ("Clients_satisfaits", "95"),
    ("Total_clients_interrogés", "100"),
    ("Nombre_de_réclamations", "2"),
    ("Total_commandes", "100"),
    ("Commandes_parfaites", "95"),
    ("Valeur_marchandises_endommagées", "100"),
    ("Nombre_de_livraisons_à_temps", "95"),
    ("Nombre_total_de_livraisons", "100"),
    ("Coût_total_transport", "400"),
    ("Nombre_unités_transportées", "100"),
    ("Volume_utilisé", "80"),
    ("Capacité_totale", "100"),
    ("Erreurs_de_picking", "1"),
    ("Total_lignes_préparées", "100"),
    ("Coûts_totaux", "3000"),
    ("Résultat_opérationnel", "1500"),
    ("Chiffre_d_affaires", "10000"),
];

/// Builds a dataset with one line per entry of `rows`
///
/// Each row starts out as the compliant baseline, with the given
/// `(column, value)` pairs replacing the baseline values.
pub(crate) fn csv(rows: &[&[(&str, &str)]]) -> String {
    build(None, rows)
}

/// Like [`csv`], but leaves out the column `skip` entirely
pub(crate) fn csv_without(skip: &str, rows: &[&[(&str, &str)]]) -> String {
    build(Some(skip), rows)
}

fn build(skip: Option<&str>, rows: &[&[(&str, &str)]]) -> String {
    let columns = BASELINE
        .iter()
        .filter(|(name, _)| Some(*name) != skip)
        .collect::<Vec<_>>();

    let mut out = columns
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(",");
    out.push('\n');

    for overrides in rows {
        let line = columns
            .iter()
            .map(|(name, default)| {
                overrides
                    .iter()
                    .find(|(column, _)| column == name)
                    .map_or(*default, |(_, value)| *value)
            })
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&line);
        out.push('\n');
    }

    out
}
