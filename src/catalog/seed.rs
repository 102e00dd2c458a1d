//! Static seed set written to an empty catalog collection

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::model::{Approach, Difficulty, Question, Topic};

/// Whitespace runs collapse into a single delimiter in document keys
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Delimiter substituted for whitespace in document keys
const KEY_DELIMITER: &str = "_";

/// Turn a topic name into a valid document key
pub fn document_key(topic_name: &str) -> String {
    WHITESPACE_RE.replace_all(topic_name, KEY_DELIMITER).into_owned()
}

/// Documents to write when seeding, keyed by sanitized topic name
pub fn seed_documents() -> Result<Vec<(String, Value)>, serde_json::Error> {
    cses_problem_set()
        .into_iter()
        .map(|topic| Ok((document_key(&topic.name), serde_json::to_value(&topic)?)))
        .collect()
}

fn question(
    id: &str,
    name: &str,
    difficulty: Difficulty,
    approaches: Vec<Approach>,
) -> Question {
    let task = id.trim_start_matches("cses_");
    Question {
        id: id.to_string(),
        name: name.to_string(),
        difficulty,
        link: format!("https://cses.fi/problemset/task/{task}"),
        approaches,
    }
}

/// The CSES topics, questions and approaches shipped with the tracker
pub fn cses_problem_set() -> Vec<Topic> {
    vec![
        Topic {
            id: String::new(),
            name: "Introductory Problems".to_string(),
            questions: vec![
                question(
                    "cses_1068",
                    "Weird Algorithm",
                    Difficulty::Easy,
                    vec![Approach::new(
                        "Simulation Approach",
                        "The problem asks us to simulate a simple algorithm. If n is even, divide it by 2. If n is odd, multiply by 3 and add 1. Repeat until n is 1. We need to print the sequence of numbers. A `while` loop is perfect for this. We must use a 64-bit integer type (long long in C++) to avoid overflow, as the intermediate values can exceed the capacity of a 32-bit integer.",
                        WEIRD_ALGORITHM_SIMULATION,
                    )],
                ),
                question(
                    "cses_1083",
                    "Missing Number",
                    Difficulty::Easy,
                    vec![
                        Approach::new(
                            "Summation Formula",
                            "We are given n-1 numbers from 1 to n. The most efficient way to find the missing number is to calculate the expected sum of numbers from 1 to n using the formula S = n * (n+1) / 2. Then, we sum the numbers we are given. The difference between the expected sum and the actual sum is the missing number.",
                            MISSING_NUMBER_SUM,
                        ),
                        Approach::new(
                            "XOR Approach",
                            "A clever alternative is to use the XOR bitwise operator. The XOR of a number with itself is 0. If we XOR all numbers from 1 to n, and then XOR this result with all the given numbers, all pairs will cancel out, leaving only the missing number.",
                            MISSING_NUMBER_XOR,
                        ),
                    ],
                ),
            ],
        },
        Topic {
            id: String::new(),
            name: "Sorting and Searching".to_string(),
            questions: vec![
                question(
                    "cses_1621",
                    "Distinct Numbers",
                    Difficulty::Easy,
                    vec![
                        Approach::new(
                            "Using a Set",
                            "The problem asks for the number of distinct values in a list. The most direct way to solve this in C++ is to use `std::set`. A set is a container that stores unique elements. We can simply insert all numbers from the input into the set, and the size of the set at the end will be our answer.",
                            DISTINCT_NUMBERS_SET,
                        ),
                        Approach::new(
                            "Sorting and Counting",
                            "An alternative approach without using a set is to first sort the array. After sorting, all identical elements will be adjacent. We can then iterate through the sorted array and count the number of unique elements by comparing adjacent elements.",
                            DISTINCT_NUMBERS_SORT,
                        ),
                    ],
                ),
                question(
                    "cses_1091",
                    "Concert Tickets",
                    Difficulty::Medium,
                    vec![Approach::new(
                        "Using Multiset",
                        "The problem requires finding a ticket with price at most `p` for each customer. A `std::multiset` is a perfect data structure. It keeps elements sorted and allows duplicates. For each customer, we use `upper_bound(p)` to find the first ticket price strictly greater than `p`. If we go back one position from there, we find the best available ticket (the most expensive one that is still at most `p`). If such a ticket exists, we assign it to the customer and remove it from the multiset.",
                        CONCERT_TICKETS_MULTISET,
                    )],
                ),
            ],
        },
    ]
}

const WEIRD_ALGORITHM_SIMULATION: &str = r#"#include <iostream>

int main() {
    long long n;
    std::cin >> n;
    while (true) {
        std::cout << n << " ";
        if (n == 1) break;
        if (n % 2 == 0) {
            n /= 2;
        } else {
            n = n * 3 + 1;
        }
    }
    std::cout << std::endl;
    return 0;
}"#;

const MISSING_NUMBER_SUM: &str = r#"#include <iostream>

int main() {
    long long n;
    std::cin >> n;
    long long expected_sum = n * (n + 1) / 2;
    long long actual_sum = 0;
    for (int i = 0; i < n - 1; ++i) {
        int a;
        std::cin >> a;
        actual_sum += a;
    }
    std::cout << expected_sum - actual_sum << std::endl;
    return 0;
}"#;

const MISSING_NUMBER_XOR: &str = r#"#include <iostream>

int main() {
    long long n;
    std::cin >> n;
    int xor_sum = 0;
    for (int i = 1; i <= n; ++i) {
        xor_sum ^= i;
    }
    for (int i = 0; i < n - 1; ++i) {
        int a;
        std::cin >> a;
        xor_sum ^= a;
    }
    std::cout << xor_sum << std::endl;
    return 0;
}"#;

const DISTINCT_NUMBERS_SET: &str = r#"#include <iostream>
#include <set>

int main() {
    int n;
    std::cin >> n;
    std::set<int> distinct_numbers;
    for (int i = 0; i < n; ++i) {
        int x;
        std::cin >> x;
        distinct_numbers.insert(x);
    }
    std::cout << distinct_numbers.size() << std::endl;
    return 0;
}"#;

const DISTINCT_NUMBERS_SORT: &str = r#"#include <iostream>
#include <vector>
#include <algorithm>

int main() {
    int n;
    std::cin >> n;
    std::vector<int> numbers(n);
    for (int i = 0; i < n; ++i) {
        std::cin >> numbers[i];
    }
    std::sort(numbers.begin(), numbers.end());
    int count = 1;
    if (n == 0) count = 0;
    for (int i = 1; i < n; ++i) {
        if (numbers[i] != numbers[i-1]) {
            count++;
        }
    }
    std::cout << count << std::endl;
    return 0;
}"#;

const CONCERT_TICKETS_MULTISET: &str = r#"#include <iostream>
#include <set>
#include <vector>

int main() {
    std::ios_base::sync_with_stdio(false);
    std::cin.tie(NULL);
    int n, m;
    std::cin >> n >> m;
    std::multiset<int> tickets;
    for (int i = 0; i < n; ++i) {
        int h;
        std::cin >> h;
        tickets.insert(h);
    }
    for (int i = 0; i < m; ++i) {
        int p;
        std::cin >> p;
        auto it = tickets.upper_bound(p);
        if (it == tickets.begin()) {
            std::cout << -1 << "\n";
        } else {
            --it;
            std::cout << *it << "\n";
            tickets.erase(it);
        }
    }
    return 0;
}"#;
