//! Source fixtures shared by the integration tests.
#![allow(dead_code)]

pub const MERGE_SORT: &str = r#"def merge_sort(arr):
    if len(arr) <= 1:
        return arr
    mid = len(arr) // 2
    left = merge_sort(arr[:mid])
    right = merge_sort(arr[mid:])
    return merge(left, right)

def merge(left, right):
    result = []
    i = j = 0
    while i < len(left) and j < len(right):
        if left[i] <= right[j]:
            result.append(left[i])
            i += 1
        else:
            result.append(right[j])
            j += 1
    result.extend(left[i:])
    result.extend(right[j:])
    return result
"#;

pub const QUICK_SORT: &str = r#"def quick_sort(arr):
    if len(arr) <= 1:
        return arr
    pivot = arr[len(arr) // 2]
    left = [x for x in arr if x < pivot]
    middle = [x for x in arr if x == pivot]
    right = [x for x in arr if x > pivot]
    return quick_sort(left) + middle + quick_sort(right)
"#;

pub const HEAP_SORT: &str = r#"def heapify(arr, n, i):
    largest = i
    l = 2 * i + 1
    r = 2 * i + 2
    if l < n and arr[l] > arr[largest]:
        largest = l
    if r < n and arr[r] > arr[largest]:
        largest = r
    if largest != i:
        arr[i], arr[largest] = arr[largest], arr[i]
        heapify(arr, n, largest)

def heap_sort(arr):
    n = len(arr)
    for i in range(n // 2 - 1, -1, -1):
        heapify(arr, n, i)
    for i in range(n - 1, 0, -1):
        arr[i], arr[0] = arr[0], arr[i]
        heapify(arr, i, 0)
"#;

pub const BUBBLE_SORT: &str = r#"def bubble_sort(arr):
    n = len(arr)
    for i in range(n):
        for j in range(0, n - i - 1):
            if arr[j] > arr[j + 1]:
                arr[j], arr[j + 1] = arr[j + 1], arr[j]
    return arr
"#;

pub const BUBBLE_SORT_C: &str = r#"void bubbleSort(int arr[], int n) {
    for (int i = 0; i < n - 1; i++) {
        for (int j = 0; j < n - i - 1; j++) {
            if (arr[j] > arr[j + 1]) {
                int temp = arr[j];
                arr[j] = arr[j + 1];
                arr[j + 1] = temp;
            }
        }
    }
}
"#;

pub const INSERTION_SORT: &str = r#"def insertion_sort(arr):
    for i in range(1, len(arr)):
        key = arr[i]
        j = i - 1
        while j >= 0 and arr[j] > key:
            arr[j + 1] = arr[j]
            j -= 1
        arr[j + 1] = key
    return arr
"#;

pub const BINARY_SEARCH: &str = r#"def binary_search(arr, target):
    lo, hi = 0, len(arr) - 1
    while lo <= hi:
        mid = (lo + hi) // 2
        if arr[mid] == target:
            return mid
        elif arr[mid] < target:
            lo = mid + 1
        else:
            hi = mid - 1
    return -1
"#;

pub const LINEAR_SEARCH: &str = r#"def linear_search(items, target):
    for i in range(len(items)):
        if items[i] == target:
            return i
    return -1
"#;

pub const DFS: &str = r#"def dfs(graph, node, visited=None):
    if visited is None:
        visited = set()
    visited.add(node)
    for neighbor in graph[node]:
        if neighbor not in visited:
            dfs(graph, neighbor, visited)
    return visited
"#;

pub const BFS: &str = r#"from collections import deque

def bfs(graph, start):
    visited = {start}
    queue = deque([start])
    order = []
    while queue:
        node = queue.popleft()
        order.append(node)
        for nxt in graph[node]:
            if nxt not in visited:
                visited.add(nxt)
                queue.append(nxt)
    return order
"#;

pub const DIJKSTRA: &str = r#"import heapq

def dijkstra(graph, source):
    dist = {node: float('inf') for node in graph}
    dist[source] = 0
    pq = [(0, source)]
    while pq:
        d, u = heapq.heappop(pq)
        if d > dist[u]:
            continue
        for v, w in graph[u]:
            if dist[u] + w < dist[v]:
                dist[v] = dist[u] + w
                heapq.heappush(pq, (dist[v], v))
    return dist
"#;

pub const LCS: &str = r#"def lcs(a, b):
    m, n = len(a), len(b)
    dp = [[0] * (n + 1) for _ in range(m + 1)]
    for i in range(1, m + 1):
        for j in range(1, n + 1):
            if a[i - 1] == b[j - 1]:
                dp[i][j] = dp[i - 1][j - 1] + 1
            else:
                dp[i][j] = max(dp[i - 1][j], dp[i][j - 1])
    return dp[m][n]
"#;

pub const FIB_MEMO: &str = r#"def fib(n, memo={}):
    if n in memo:
        return memo[n]
    if n <= 1:
        return n
    memo[n] = fib(n - 1, memo) + fib(n - 2, memo)
    return memo[n]
"#;

pub const INORDER: &str = r#"def inorder(node, out):
    if node is None:
        return
    inorder(node.left, out)
    out.append(node.value)
    inorder(node.right, out)
"#;

pub const NAIVE_FIB: &str = r#"def fib(n):
    if n < 2:
        return n
    return fib(n - 1) + fib(n - 2)
"#;

/// Every catalogue fixture with the single entry it should match.
pub const CATALOGUE_FIXTURES: &[(&str, &str)] = &[
    (MERGE_SORT, "Merge Sort"),
    (QUICK_SORT, "Quick Sort"),
    (HEAP_SORT, "Heap Sort"),
    (BUBBLE_SORT, "Bubble Sort"),
    (BUBBLE_SORT_C, "Bubble Sort"),
    (INSERTION_SORT, "Insertion Sort"),
    (BINARY_SEARCH, "Binary Search"),
    (LINEAR_SEARCH, "Linear Search"),
    (DFS, "Depth-First Search"),
    (BFS, "Breadth-First Search"),
    (DIJKSTRA, "Dijkstra"),
    (LCS, "Dynamic Programming"),
    (FIB_MEMO, "Dynamic Programming"),
    (INORDER, "Tree Traversal"),
];

/// `depth` nested counting loops inside one C function.
pub fn nested_loops(depth: usize) -> String {
    let mut src = String::from("void walk(int n) {\n");
    for d in 0..depth {
        src.push_str(&format!(
            "{}for (int i{d} = 0; i{d} < n; i{d}++) {{\n",
            "    ".repeat(d + 1)
        ));
    }
    src.push_str(&format!("{}total++;\n", "    ".repeat(depth + 1)));
    for d in (0..depth).rev() {
        src.push_str(&format!("{}}}\n", "    ".repeat(d + 1)));
    }
    src.push_str("}\n");
    src
}
