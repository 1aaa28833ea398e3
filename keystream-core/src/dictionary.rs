// File:    dictionary.rs
// Author:  apezoo
// Date:    2025-11-03
//
// Description: Word list used to score decoded candidates, with the built-in French vocabulary.
//
// License:
// This project is licensed under the terms of the GNU AGPLv3 license.
// See the LICENSE.md file in the project root for full license information.

//! Dictionary scoring for decoded text.

use indexmap::IndexSet;

/// Built-in French word list, in its published order.
///
/// The list is reproduced entry for entry, 172 entries with duplicates
/// (`QUE`, `OU`, `UN`, `LA`, `DEVOIR`). [`Dictionary`] keeps a single entry for
/// each word, so a duplicated word adds its length to a score once. Scoring
/// the raw list entry by entry counts it twice: the default key 2 decoding
/// `QUEWYCRLNE?BXY` scores 3 here and 6 entry by entry.
pub const FRENCH_WORDS: &[&str] = &[
    "LE", "LA", "LES", "UN", "UNE", "DES", "DU", "DE", "AU", "AUX",
    "JE", "TU", "IL", "ELLE", "NOUS", "VOUS", "ILS", "ELLES", "ON", "CE", "CELA", "CELUI",
    "QUI", "QUE", "QUOI", "DONT", "OU",
    "ETRE", "AVOIR", "FAIRE", "DIRE", "POUVOIR", "ALLER", "VOULOIR", "VOIR", "SAVOIR",
    "DEVOIR", "PRENDRE", "PARLER", "METTRE", "DONNER", "TROUVER", "COMPRENDRE",
    "VENIR", "PASSER", "POURSUIVRE", "LIRE", "ECRIRE", "SORTIR",
    "BONJOUR", "SALUT", "MERCI", "OUI", "NON", "EXCUSE", "PARDON", "BIEN", "MAL",
    "MAISON", "FILLE", "GARCON", "HOMME", "FEMME", "AMIS", "AMIE", "TRAVAIL",
    "TEMPS", "JOUR", "NUIT", "MATIN", "SOIR", "HEURE", "MINUTE",
    "SUR", "SOUS", "AVEC", "SANS", "DANS", "ENTRE", "PENDANT", "APRES", "AVANT", "POUR",
    "PAR", "VERS", "CHEZ", "CONTRE", "PRES", "DEPUIS", "SELON",
    "ET", "MAIS", "OU", "DONC", "CAR", "COMME", "SI", "LORSQUE", "PARCE", "QUE",
    "UN", "DEUX", "TROIS", "QUATRE", "CINQ", "SIX", "SEPT", "HUIT", "NEUF", "DIX",
    "FIN", "EXERCICE", "EXERCICES", "QUESTION", "REPONSE", "DEVOIR", "PROFESSEUR",
    "ETUDIANT", "COURS", "LECON", "SUJET",
    "SYSTEME", "CODE", "MESSAGE", "CLE", "DONNEE", "BIT", "SEQUENCE", "LOGIQUE",
    "ALGORITHME", "ANALYSE", "RESULTAT", "ERREUR", "VALEUR",
    "IMPORTANT", "DIFFICILE", "INTERESSANT", "POSSIBLE", "COMPLETE",
    "EVIDEMMENT", "ACTUELLEMENT", "RAPIDEMENT",
    "ANNEE", "MOIS", "SEMAINE", "MAIN", "TETE", "OEIL", "PAYS", "VILLE", "MONDE",
    "VRAI", "FAUX", "PETIT", "GRAND", "NOUVEAU", "VIEUX", "BEAU", "BON", "MEILLEUR",
    "TOUJOURS", "JAMAIS", "PEUT", "PEUTETRE", "DEJA", "MAINTENANT", "ICI", "LA",
    "LAHAUT", "LAISSER", "DEMANDER", "REPONDRE",
];

/// An insertion-ordered set of uppercase words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    words: IndexSet<String>,
}

impl Dictionary {
    /// Builds a dictionary, uppercasing every word and keeping the first
    /// occurrence of duplicates.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            words: words
                .into_iter()
                .map(|w| w.as_ref().trim().to_uppercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// The built-in French dictionary.
    #[must_use]
    pub fn french() -> Self {
        Self::new(FRENCH_WORDS)
    }

    /// Number of distinct words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the dictionary holds no word.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Whether `word` (in any case) is in the dictionary.
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_uppercase())
    }

    /// Iterates over the words in insertion order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }

    /// Sums the lengths of every word that occurs somewhere in `text`.
    ///
    /// A word counts once no matter how often it occurs.
    #[must_use]
    pub fn score(&self, text: &str) -> usize {
        let text = text.to_uppercase();
        self.words
            .iter()
            .filter(|w| text.contains(w.as_str()))
            .map(String::len)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_occurrence_counts_once() {
        let dict = Dictionary::new(["LE"]);
        assert_eq!(dict.score("LELE"), 2);
    }

    #[test]
    fn test_overlapping_words_all_count() {
        let dict = Dictionary::new(["FIN", "DE", "EXERCICE", "EXERCICES", "CE"]);
        // FIN + DE + EXERCICE + CE; EXERCICES is not present.
        assert_eq!(dict.score("FINDELEXERCICE"), 3 + 2 + 8 + 2);
    }

    #[test]
    fn test_case_is_normalised() {
        let dict = Dictionary::new(["le", " Un "]);
        assert!(dict.contains("LE"));
        assert!(dict.contains("un"));
        assert_eq!(dict.score("unle"), 4);
    }

    #[test]
    fn test_no_match_scores_zero() {
        assert_eq!(Dictionary::new(["A"]).score("N"), 0);
        assert_eq!(Dictionary::default().score("ANYTHING"), 0);
    }

    #[test]
    fn test_french_dictionary_collapses_duplicates() {
        assert_eq!(FRENCH_WORDS.len(), 172);
        let dict = Dictionary::french();
        assert_eq!(dict.len(), 167);
        assert_eq!(dict.words().next(), Some("LE"));
        assert!(dict.contains("EXERCICE"));
    }

    #[test]
    fn test_duplicated_builtin_word_scores_once() {
        assert_eq!(FRENCH_WORDS.iter().filter(|&&w| w == "QUE").count(), 2);
        let entry_by_entry: usize = FRENCH_WORDS
            .iter()
            .filter(|w| "QUEWYCRLNE?BXY".contains(**w))
            .map(|w| w.len())
            .sum();
        assert_eq!(entry_by_entry, 6);
        assert_eq!(Dictionary::french().score("QUEWYCRLNE?BXY"), 3);
    }
}
