//! Fixed word lists used by the normalizer.
//!
//! [`DOMAIN_KEYWORDS`] is the data-science allowlist: a lemma found here is always
//! retained, even if it is also an English stopword (`for`, `in`, `from`, ...).
//! [`STOPWORDS`] is the standard English stopword list.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Data science, statistics and machine-learning vocabulary that always survives normalization.
pub const DOMAIN_KEYWORDS: &[&str] = &[
    // Core data operations
    "data", "analysis", "analyze", "clean", "cleanse", "preprocess", "transform", "feature",
    "engineering", "model", "train", "training", "predict", "prediction", "evaluate",
    "evaluation", "score", "scoring",
    // Data structures
    "dataframe", "series", "array", "matrix", "tensor", "dataset", "column", "row", "index",
    "header", "nan", "null", "missing",
    // Visualization
    "plot", "chart", "graph", "visualize", "visualization", "histogram", "scatter", "bar",
    "line", "heatmap",
    // Libraries
    "pandas", "numpy", "sklearn", "scikit", "tensorflow", "pytorch", "keras", "seaborn",
    "matplotlib", "plotly", "statsmodels", "scipy",
    // Jupyter
    "jupyter", "notebook", "cell", "kernel", "magic", "ipython",
    // Statistics
    "mean", "median", "mode", "std", "standard", "deviation", "variance", "correlation",
    "regression", "classification", "cluster", "clustering", "outlier", "normalize",
    "standardize", "scale",
    // Machine learning
    "machine", "learning", "ml", "ai", "algorithm", "supervised", "unsupervised", "linear",
    "logistic", "random", "forest", "xgboost", "lightgbm", "catboost", "neural", "network",
    "nn", "deep", "cnn", "rnn",
    // Metrics
    "accuracy", "precision", "recall", "f1", "auc", "roc", "mse", "rmse", "mae", "r2",
    // Python keywords that carry meaning in snippet titles
    "import", "from", "as", "def", "return", "for", "in", "if", "else",
];

/// Standard English stopwords.
pub const STOPWORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all",
    "almost", "alone", "along", "already", "also", "although", "always", "am", "among",
    "amongst", "amount", "an", "and", "another", "any", "anyhow", "anyone", "anything",
    "anyway", "anywhere", "are", "around", "as", "at", "back", "be", "became", "because",
    "become", "becomes", "becoming", "been", "before", "beforehand", "behind", "being",
    "below", "beside", "besides", "between", "beyond", "both", "bottom", "but", "by", "ca",
    "call", "can", "cannot", "could", "did", "do", "does", "doing", "done", "down", "due",
    "during", "each", "eight", "either", "eleven", "else", "elsewhere", "empty", "enough",
    "even", "ever", "every", "everyone", "everything", "everywhere", "except", "few",
    "fifteen", "fifty", "first", "five", "for", "former", "formerly", "forty", "four", "from",
    "front", "full", "further", "get", "give", "go", "had", "has", "have", "he", "hence",
    "her", "here", "hereafter", "hereby", "herein", "hereupon", "hers", "herself", "him",
    "himself", "his", "how", "however", "hundred", "i", "if", "in", "indeed", "into", "is",
    "it", "its", "itself", "just", "keep", "last", "latter", "latterly", "least", "less",
    "made", "make", "many", "may", "me", "meanwhile", "might", "mine", "more", "moreover",
    "most", "mostly", "move", "much", "must", "my", "myself", "name", "namely", "neither",
    "never", "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
    "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto",
    "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own",
    "part", "per", "perhaps", "please", "put", "quite", "rather", "re", "really", "regarding",
    "same", "say", "see", "seem", "seemed", "seeming", "seems", "serious", "several", "she",
    "should", "show", "side", "since", "six", "sixty", "so", "some", "somehow", "someone",
    "something", "sometime", "sometimes", "somewhere", "still", "such", "take", "ten", "than",
    "that", "the", "their", "them", "themselves", "then", "thence", "there", "thereafter",
    "thereby", "therefore", "therein", "thereupon", "these", "they", "third", "this", "those",
    "though", "three", "through", "throughout", "thru", "thus", "to", "together", "too", "top",
    "toward", "towards", "twelve", "twenty", "two", "under", "unless", "until", "up", "upon",
    "us", "used", "using", "various", "very", "via", "was", "we", "well", "were", "what",
    "whatever", "when", "whence", "whenever", "where", "whereafter", "whereas", "whereby",
    "wherein", "whereupon", "wherever", "whether", "which", "while", "whither", "who",
    "whoever", "whole", "whom", "whose", "why", "will", "with", "within", "without", "would",
    "yet", "you", "your", "yours", "yourself", "yourselves",
];

/// Single letters kept despite the two-character minimum (axis names in plotting code).
pub const KEPT_SINGLE_LETTERS: &[&str] = &["x", "y", "z"];

static KEYWORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| DOMAIN_KEYWORDS.iter().copied().collect());

static STOPWORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOPWORDS.iter().copied().collect());

/// Returns `true` if `word` is in the domain keyword allowlist.
pub fn is_domain_keyword(word: &str) -> bool {
    KEYWORD_SET.contains(word)
}

/// Returns `true` if `word` is an English stopword.
pub fn is_stopword(word: &str) -> bool {
    STOPWORD_SET.contains(word)
}
